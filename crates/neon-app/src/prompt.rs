//! Interactive terminal prompts for registration, login and setup.

use dialoguer::{Input, Password, Select};

use neon_storage::{Account, AccountRepository, NewAccount, Occupation, Registration};

use crate::AppResult;

const LOGIN_ATTEMPTS: usize = 3;

/// Fill in any registration fields not given on the command line and
/// create the account.
pub fn register(repo: &AccountRepository, args: crate::cli::RegisterArgs) -> AppResult<()> {
    println!("Create your Neon account\n");

    let email = match args.email {
        Some(email) => email,
        None => Input::new().with_prompt("Email").interact_text()?,
    };
    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?;
    let first_name = match args.first_name {
        Some(name) => name,
        None => Input::new().with_prompt("First name").interact_text()?,
    };
    let last_name = match args.last_name {
        Some(name) => name,
        None => Input::new()
            .with_prompt("Last name")
            .allow_empty(true)
            .interact_text()?,
    };
    let age = match args.age {
        Some(age) => Some(age),
        None => {
            let raw: String = Input::new()
                .with_prompt("Age (optional)")
                .allow_empty(true)
                .validate_with(|s: &String| -> Result<(), &str> {
                    if s.trim().is_empty() || s.trim().parse::<u32>().is_ok() {
                        Ok(())
                    } else {
                        Err("Age must be a whole number")
                    }
                })
                .interact_text()?;
            raw.trim().parse().ok()
        }
    };
    let occupation = match args.occupation {
        Some(occupation) => occupation,
        None => {
            let choices = [Occupation::Student, Occupation::Employee];
            let labels = ["Student", "Employee"];
            let idx = Select::new()
                .with_prompt("Occupation")
                .items(&labels)
                .default(0)
                .interact()?;
            choices[idx]
        }
    };
    let organization = match args.organization {
        Some(org) => org,
        None => Input::new()
            .with_prompt(occupation.organization_label())
            .allow_empty(true)
            .interact_text()?,
    };

    let form = NewAccount {
        email,
        password,
        first_name,
        last_name,
        age,
        occupation: Some(occupation),
        organization,
    };
    match repo.register(form)? {
        Registration::Created(id) => {
            tracing::info!(user_id = %id, "Registration complete");
            println!("\nAccount created. Run `neon setup` to choose your wake word.");
        }
        Registration::DuplicateEmail => {
            println!("\nAn account with that email already exists.");
        }
    }
    Ok(())
}

/// Ask for credentials until they match or attempts run out.
pub fn login(repo: &AccountRepository) -> AppResult<Option<Account>> {
    for attempt in 1..=LOGIN_ATTEMPTS {
        let email: String = Input::new().with_prompt("Email").interact_text()?;
        let password = Password::new().with_prompt("Password").interact()?;
        if let Some(account) = repo.login(&email, &password)? {
            println!("\nWelcome, {}!\n", account.first_name);
            return Ok(Some(account));
        }
        tracing::warn!(attempt, "Login failed");
        println!("Invalid email or password.\n");
    }
    Ok(None)
}

/// Ask for a wake word and store it. Returns the stored form.
pub fn choose_wake_word(repo: &AccountRepository, account: &Account) -> AppResult<String> {
    println!("Choose the phrase that wakes Neon up.");
    let word: String = Input::new()
        .with_prompt("Wake word")
        .default("Hey Alexa".to_string())
        .validate_with(|s: &String| -> Result<(), &str> {
            if s.trim().is_empty() {
                Err("Wake word cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;
    let stored = repo.update_wake_word(account.id, &word)?;
    println!("Wake word set to '{stored}'.\n");
    Ok(stored)
}
