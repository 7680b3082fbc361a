//! Key-binding help screen.

pub const HELP_LINES: &[&str] = &[
    "",
    "Commands:",
    "",
    "  H  switch to hosts view",
    "  S  switch to slabs view",
    "  C  switch to command view",
    "",
    "  J  scroll down",
    "  K  scroll up",
    "",
    "  Q  quit (or ^C)",
    "",
    "Press any key to resume: ",
];
