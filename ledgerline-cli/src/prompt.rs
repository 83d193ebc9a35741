use anyhow::Result;
use ledgerline_ingest::TypeSelection;
use std::io::{self, BufRead, Write};

use crate::loader::{MAX_PASSWORD_ATTEMPTS, PasswordSource};

/// `None` at end of input.
fn prompt(input: &mut impl BufRead, label: &str) -> Result<Option<String>> {
    print!("{}: ", label);
    io::stdout().flush().ok();
    let mut s = String::new();
    if input.read_line(&mut s)? == 0 {
        return Ok(None);
    }
    Ok(Some(s.trim().to_string()))
}

pub fn choose_statement_type() -> Result<TypeSelection> {
    choose_statement_type_from(&mut io::stdin().lock())
}

fn choose_statement_type_from(input: &mut impl BufRead) -> Result<TypeSelection> {
    println!("Statement type\n");
    println!("  1) Credit card");
    println!("  2) Current / savings account");
    println!("  3) Detect per file");
    loop {
        let Some(answer) = prompt(input, "Choose 1-3 [3]")? else {
            return Ok(TypeSelection::Auto);
        };
        match parse_choice(&answer) {
            Some(choice) => return Ok(choice),
            None => println!("Please enter 1, 2 or 3."),
        }
    }
}

fn parse_choice(answer: &str) -> Option<TypeSelection> {
    match answer.trim() {
        "" | "3" => Some(TypeSelection::Auto),
        "1" => Some(TypeSelection::CreditCard),
        "2" => Some(TypeSelection::CurrentAccount),
        other => other.parse().ok(),
    }
}

/// Asks for PDF passwords on the terminal. Offers once per run to reuse a
/// single password for every file.
pub struct PasswordPrompt<R> {
    input: R,
    same_for_all: Option<bool>,
    common: Option<String>,
}

impl PasswordPrompt<io::StdinLock<'static>> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock())
    }
}

impl<R: BufRead> PasswordPrompt<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            same_for_all: None,
            common: None,
        }
    }

    fn ask_same_for_all(&mut self) -> Result<bool> {
        loop {
            let Some(answer) = prompt(&mut self.input, "Use the same password for all PDFs? (y/n)")?
            else {
                return Ok(false);
            };
            match answer.to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => println!("Please enter 'y' or 'n'."),
            }
        }
    }
}

impl<R: BufRead> PasswordSource for PasswordPrompt<R> {
    fn next_password(&mut self, file: &str, attempt: usize) -> Result<Option<String>> {
        let same_for_all = match self.same_for_all {
            Some(same) => same,
            None => {
                println!("\nPassword required for: {file}");
                let same = self.ask_same_for_all()?;
                self.same_for_all = Some(same);
                same
            }
        };
        if same_for_all {
            if let Some(pw) = &self.common {
                return Ok(Some(pw.clone()));
            }
        }

        if attempt > 0 {
            println!("Previous password was incorrect. Attempt {} of {MAX_PASSWORD_ATTEMPTS}", attempt + 1);
        }
        let label = if same_for_all {
            "Password for all PDFs".to_string()
        } else {
            format!("Password for {file}")
        };
        let password = prompt(&mut self.input, &label)?.filter(|pw| !pw.is_empty());
        if same_for_all {
            self.common.clone_from(&password);
        }
        Ok(password)
    }

    fn rejected(&mut self) {
        self.common = None;
    }
}
