//! Terminal prompt for choosing modules

use crate::domain::Module;
use crate::error::ResolveError;
use crate::resolver::{ModulePrompt, PromptDecision};
use std::io::{self, BufRead, Write};

/// Lists modules on stderr and reads a choice from stdin
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinPrompt;

impl ModulePrompt for StdinPrompt {
    fn choose(&self, modules: &[Module]) -> Result<PromptDecision, ResolveError> {
        let mut stderr = io::stderr().lock();
        let io_err = |e: io::Error| ResolveError::Prompt {
            message: e.to_string(),
        };

        writeln!(stderr, "Found {} modules:", modules.len()).map_err(io_err)?;
        for (index, module) in modules.iter().enumerate() {
            writeln!(
                stderr,
                "  {}) {}  {}",
                index + 1,
                module.display_name(),
                module.relative_dir().display()
            )
            .map_err(io_err)?;
        }
        write!(stderr, "Operate on [a]ll, a list (e.g. 1,3 or api,web), or [n]one? ")
            .map_err(io_err)?;
        stderr.flush().map_err(io_err)?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).map_err(io_err)?;
        parse_choice(&line, modules)
    }
}

/// Interprets a prompt answer.
///
/// Empty input and `a`/`all` select everything; `n`/`none`/`q` cancel;
/// anything else is a comma-separated list of 1-based indexes or names.
pub fn parse_choice(input: &str, modules: &[Module]) -> Result<PromptDecision, ResolveError> {
    let input = input.trim();
    match input.to_lowercase().as_str() {
        "" | "a" | "all" | "y" | "yes" => return Ok(PromptDecision::All),
        "n" | "none" | "q" | "quit" => return Ok(PromptDecision::Cancel),
        _ => {}
    }

    let mut names = Vec::new();
    for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let name = match token.parse::<usize>() {
            Ok(index) => modules
                .get(index.wrapping_sub(1))
                .map(|m| m.name.clone())
                .ok_or_else(|| ResolveError::Prompt {
                    message: format!("no module numbered {}", index),
                })?,
            Err(_) => token.to_string(),
        };
        if !names.contains(&name) {
            names.push(name);
        }
    }

    if names.is_empty() {
        return Ok(PromptDecision::Cancel);
    }
    Ok(PromptDecision::Subset(names))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modules() -> Vec<Module> {
        vec![
            Module::new("api", "services/api/.version"),
            Module::new("auth", "services/auth/.version"),
            Module::new("web", "apps/web/.version"),
        ]
    }

    #[test]
    fn test_parse_choice_all_and_cancel() {
        assert_eq!(parse_choice("\n", &modules()).unwrap(), PromptDecision::All);
        assert_eq!(parse_choice("ALL", &modules()).unwrap(), PromptDecision::All);
        assert_eq!(parse_choice("n", &modules()).unwrap(), PromptDecision::Cancel);
        assert_eq!(parse_choice(" , ", &modules()).unwrap(), PromptDecision::Cancel);
    }

    #[test]
    fn test_parse_choice_indexes_and_names() {
        assert_eq!(
            parse_choice("3, 1, api", &modules()).unwrap(),
            PromptDecision::Subset(vec!["web".into(), "api".into()])
        );
    }

    #[test]
    fn test_parse_choice_out_of_range() {
        assert!(parse_choice("0", &modules()).is_err());
        assert!(parse_choice("4", &modules()).is_err());
    }
}
