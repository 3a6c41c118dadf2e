// ABOUTME: Tokenizes an operator's input line into a command name and arguments
// ABOUTME: Names are case-insensitive; blank input yields nothing to dispatch

/// A command line split into its name and positional arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub name: String,
    pub args: Vec<String>,
}

/// Split on whitespace. Returns `None` for empty or whitespace-only input.
pub fn parse_input(line: &str) -> Option<Input> {
    let mut tokens = line.split_whitespace();
    let name = tokens.next()?.to_lowercase();
    Some(Input {
        name,
        args: tokens.map(str::to_string).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_input() {
        assert_eq!(parse_input(""), None);
        assert_eq!(parse_input("   "), None);
        assert_eq!(parse_input("\t \r\n"), None);
    }

    #[test]
    fn test_name_only() {
        assert_eq!(
            parse_input("calls"),
            Some(Input {
                name: "calls".into(),
                args: vec![]
            })
        );
    }

    #[test]
    fn test_name_is_lowercased_args_are_not() {
        let input = parse_input("ATTACH-USER-DATA C1 Account ABC").unwrap();
        assert_eq!(input.name, "attach-user-data");
        assert_eq!(input.args, vec!["C1", "Account", "ABC"]);
    }

    #[test]
    fn test_repeated_whitespace() {
        let input = parse_input("  it   C1\t5551234  ").unwrap();
        assert_eq!(input.name, "it");
        assert_eq!(input.args, vec!["C1", "5551234"]);
    }
}
