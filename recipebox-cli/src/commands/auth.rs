//! Account commands: login, logout, register and status.

use clap::{Args, Subcommand};
use recipebox_core::{RegistrationForm, SessionState};

use super::prompt;
use crate::app::App;

#[derive(Args)]
pub struct AuthCommand {
    #[command(subcommand)]
    command: AuthSubcommand,
}

#[derive(Subcommand)]
enum AuthSubcommand {
    /// Sign in with email and password
    Login {
        /// Account email (prompted if omitted)
        #[arg(long, short)]
        email: Option<String>,

        /// Account password (prompted if omitted)
        #[arg(long, short)]
        password: Option<String>,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Create an account
    Register {
        #[arg(long, short)]
        email: Option<String>,

        #[arg(long, short)]
        password: Option<String>,

        /// Repeat of the password
        #[arg(long)]
        confirm: Option<String>,
    },

    /// Show who is signed in
    Status,
}

impl AuthCommand {
    pub async fn run(&self, app: &App) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            AuthSubcommand::Login { email, password } => {
                let email = prompt("Email", email.clone())?;
                let password = prompt("Password", password.clone())?;

                let mut session = app.session();
                session.check();
                let user = session.sign_in(email.trim(), &password).await?;
                println!(
                    "Signed in as {}",
                    user.email.as_deref().unwrap_or(&user.uid)
                );
                Ok(())
            }

            AuthSubcommand::Logout => {
                let mut session = app.session();
                session.check();
                session.sign_out().await?;
                println!("Signed out");
                Ok(())
            }

            AuthSubcommand::Register {
                email,
                password,
                confirm,
            } => {
                let form = RegistrationForm::new(
                    prompt("Email", email.clone())?,
                    prompt("Password", password.clone())?,
                    prompt("Confirm password", confirm.clone())?,
                );

                let user = app.profiles().register(&form).await?;
                println!("Registration successful!");
                println!("Account: {}", user.email.as_deref().unwrap_or(&user.uid));
                println!("Run 'recipes auth login' to sign in.");
                Ok(())
            }

            AuthSubcommand::Status => {
                let mut session = app.session();
                match (session.check(), session.current_user()) {
                    (SessionState::Authenticated, Some(user)) => {
                        println!(
                            "Signed in as {}",
                            user.email.as_deref().unwrap_or(&user.uid)
                        );
                        println!("User ID: {}", user.uid);
                    }
                    (SessionState::Authenticated, None) => {
                        println!("Session expired. Run 'recipes auth login' to sign in again.");
                    }
                    _ => println!("Not signed in"),
                }
                Ok(())
            }
        }
    }
}
