use crate::planner::PlannerError;

/// Explicit aliases, checked before prefix matching.
const ALIASES: &[(&str, &str)] = &[
    ("p", "plan"),
    ("c", "check"),
    ("ch", "check"),
    ("tick", "check"),
    ("cg", "check-goal"),
    ("ug", "uncheck-goal"),
    ("u", "uncheck"),
    ("unch", "uncheck"),
    ("untick", "uncheck"),
    ("ag", "add-goal"),
    ("addgoal", "add-goal"),
    ("newgoal", "add-goal"),
    ("af", "add-food"),
    ("afi", "add-food-info"),
    ("aw", "add-water"),
    ("water", "add-water"),
    ("s", "show"),
    ("sh", "show"),
    ("display", "show"),
    ("v", "show"),
    ("i", "init"),
    ("init", "init"),
    ("initialize", "init"),
    ("h", "help"),
    ("helpme", "help"),
    ("?", "help"),
];

/// Full command names used for prefix matching.
pub const COMMANDS: &[&str] = &[
    "interactive",
    "init",
    "show",
    "check",
    "uncheck",
    "check-goal",
    "uncheck-goal",
    "add-goal",
    "plan",
    "add-food",
    "add-food-info",
    "add-water",
    "sort-food",
    "archive",
    "serve",
    "help",
];

/// Global options that take a separate value.
const VALUE_OPTIONS: &[&str] = &["--dir", "--date"];

/// Maps an alias, a full command name or a unique command prefix to the full command. Unknown
/// tokens come back unchanged so the argument parser can report them.
pub fn resolve_command(token: &str) -> Result<String, PlannerError> {
    if let Some((_, command)) = ALIASES.iter().find(|(alias, _)| *alias == token) {
        return Ok(command.to_string());
    }
    if COMMANDS.contains(&token) {
        return Ok(token.to_string());
    }

    let matches: Vec<_> = COMMANDS.iter().filter(|v| v.starts_with(token)).collect();
    match matches.as_slice() {
        [] => Ok(token.to_string()),
        [command] => Ok(command.to_string()),
        _ => Err(PlannerError::AmbiguousCommand {
            token: token.to_string(),
            candidates: matches.iter().map(|v| v.to_string()).collect(),
        }),
    }
}

/// Resolves the command token of a full argument list in place. The first element is the program
/// name, global options before the command are skipped.
pub fn resolve_args(args: &mut [String]) -> Result<(), PlannerError> {
    let mut position = 1;
    while let Some(arg) = args.get(position) {
        if VALUE_OPTIONS.contains(&arg.as_str()) {
            position += 2;
        } else if arg.starts_with('-') {
            position += 1;
        } else {
            args[position] = resolve_command(arg)?;
            break;
        }
    }
    Ok(())
}
