//! How to proceed when the upstream tree has uncommitted changes.

use std::fmt;
use std::io::{BufRead, Write};
use std::path::Path;

/// Decision source for the local-modification check.
pub enum ConfirmPolicy {
    /// Never proceed (non-interactive default).
    Abort,
    /// Always proceed (`--yes`).
    Proceed,
    /// Ask a callback; `true` means continue.
    Ask(Box<dyn Fn(&Path) -> bool>),
}

impl ConfirmPolicy {
    pub fn decide(&self, root: &Path) -> bool {
        match self {
            Self::Abort => false,
            Self::Proceed => true,
            Self::Ask(ask) => ask(root),
        }
    }

    /// Prompt on stdin/stderr.
    pub fn stdin_prompt() -> Self {
        Self::Ask(Box::new(|root: &Path| {
            let stdin = std::io::stdin();
            let stderr = std::io::stderr();
            prompt(root, &mut stdin.lock(), &mut stderr.lock())
        }))
    }
}

impl fmt::Debug for ConfirmPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Abort => f.write_str("Abort"),
            Self::Proceed => f.write_str("Proceed"),
            Self::Ask(_) => f.write_str("Ask(..)"),
        }
    }
}

/// Print the warning and read an answer. Only `y`/`Y` proceeds; EOF and read
/// errors decline.
pub fn prompt<R: BufRead, W: Write>(root: &Path, input: &mut R, output: &mut W) -> bool {
    let _ = writeln!(
        output,
        "Warning: {} has uncommitted changes",
        root.display()
    );
    let _ = write!(output, "Continue anyway? [y/N]: ");
    let _ = output.flush();

    let mut answer = String::new();
    match input.read_line(&mut answer) {
        Ok(_) => answer.trim().eq_ignore_ascii_case("y"),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn answer(input: &str) -> (bool, String) {
        let mut out = Vec::new();
        let ok = prompt(Path::new("/up/meta-hymo"), &mut Cursor::new(input), &mut out);
        (ok, String::from_utf8(out).unwrap())
    }

    #[test]
    fn yes_answers_proceed() {
        assert!(answer("y\n").0);
        assert!(answer("Y\n").0);
        assert!(answer("  y  \n").0);
    }

    #[test]
    fn anything_else_declines() {
        assert!(!answer("n\n").0);
        assert!(!answer("\n").0);
        assert!(!answer("").0);
        assert!(!answer("sure\n").0);
        assert!(!answer("yes\n").0);
    }

    #[test]
    fn prompt_text_names_the_tree() {
        let (_, out) = answer("n\n");
        assert!(out.contains("/up/meta-hymo has uncommitted changes"));
        assert!(out.ends_with("Continue anyway? [y/N]: "));
    }

    #[test]
    fn fixed_policies() {
        let root = Path::new("/x");
        assert!(!ConfirmPolicy::Abort.decide(root));
        assert!(ConfirmPolicy::Proceed.decide(root));
        assert!(ConfirmPolicy::Ask(Box::new(|_: &Path| true)).decide(root));
    }
}
