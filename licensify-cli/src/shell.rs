//! Interactive dashboard shell
//!
//! Keeps one [`LiveDashboard`] alive across commands so page-local state
//! (search, filters, page number) behaves as it would in a browser tab.

use crate::{render, report_login_failure, LiveDashboard};
use anyhow::{Context, Result};
use licensify_app::{
    AppRoute, CredentialField, DialogAction, MutationOutcome, Page, RequestTab, Session,
    StatusFilter,
};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
enum ShellCommand {
    Go(String),
    Search(String),
    Status(StatusFilter),
    Tab(RequestTab),
    Next,
    Prev,
    Page(usize),
    Request { license: String, comment: String },
    Decide {
        action: DialogAction,
        request_id: String,
        comment: String,
    },
    Refresh,
    Nav,
    Whoami,
    Login(String),
    Logout,
    Help,
    Quit,
}

fn parse_command(input: &str) -> Result<ShellCommand, String> {
    let input = input.trim();
    let (verb, rest) = match input.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (input, ""),
    };

    let command = match verb.to_lowercase().as_str() {
        "go" | "open" => ShellCommand::Go(required(rest, "go <path>")?.to_string()),
        "search" | "s" => ShellCommand::Search(rest.to_string()),
        "status" => ShellCommand::Status(required(rest, "status <filter>")?.parse()?),
        "tab" => ShellCommand::Tab(required(rest, "tab <pending|processed>")?.parse()?),
        "next" | "n" => ShellCommand::Next,
        "prev" | "p" => ShellCommand::Prev,
        "page" => ShellCommand::Page(
            required(rest, "page <number>")?
                .parse()
                .map_err(|_| format!("Not a page number: {}", rest))?,
        ),
        "request" => {
            let (license, comment) =
                split_license(required(rest, "request <license> [-- comment]")?)?;
            ShellCommand::Request {
                license: license.to_string(),
                comment: comment.to_string(),
            }
        }
        "accept" | "reject" => {
            let action = if verb.eq_ignore_ascii_case("accept") {
                DialogAction::Accept
            } else {
                DialogAction::Reject
            };
            let (request_id, comment) =
                split_first(required(rest, &format!("{} <request-id> <comment>", verb))?);
            ShellCommand::Decide {
                action,
                request_id: request_id.to_string(),
                comment: comment.to_string(),
            }
        }
        "refresh" | "r" => ShellCommand::Refresh,
        "nav" => ShellCommand::Nav,
        "whoami" => ShellCommand::Whoami,
        "login" => ShellCommand::Login(required(rest, "login <email>")?.to_string()),
        "logout" => ShellCommand::Logout,
        "help" | "h" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => return Err(format!("Unknown command: {}", other)),
    };
    Ok(command)
}

fn required<'a>(rest: &'a str, usage: &str) -> Result<&'a str, String> {
    if rest.is_empty() {
        Err(format!("Usage: {}", usage))
    } else {
        Ok(rest)
    }
}

/// License names may contain spaces, so the name is either quoted or ends at `--`
fn split_license(text: &str) -> Result<(&str, &str), String> {
    let (license, comment) = if let Some(quoted) = text.strip_prefix('"') {
        let (license, tail) = quoted
            .split_once('"')
            .ok_or_else(|| "Unclosed quote in license name".to_string())?;
        let tail = tail.trim_start();
        (license, tail.strip_prefix("--").unwrap_or(tail))
    } else if let Some(comment) = text.strip_prefix("--") {
        ("", comment)
    } else if let Some((license, comment)) = text.split_once(" -- ") {
        (license, comment)
    } else {
        (text.strip_suffix(" --").unwrap_or(text), "")
    };

    let license = license.trim();
    if license.is_empty() {
        return Err("Usage: request <license> [-- comment]".to_string());
    }
    Ok((license, comment.trim()))
}

fn split_first(text: &str) -> (&str, &str) {
    match text.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim()),
        None => (text, ""),
    }
}

pub struct Shell<'a> {
    dashboard: &'a mut LiveDashboard,
    session_rx: watch::Receiver<Session>,
    logged_in: bool,
}

impl<'a> Shell<'a> {
    pub fn new(dashboard: &'a mut LiveDashboard) -> Self {
        let session_rx = dashboard.subscribe();
        let logged_in = session_rx.borrow().is_logged_in;
        Self {
            dashboard,
            session_rx,
            logged_in,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        println!("🔐 Licensify dashboard");
        println!("💡 Type 'help' for commands, 'quit' to exit\n");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let start = if self.dashboard.session().is_logged_in {
            AppRoute::Licenses.path()
        } else {
            AppRoute::Login.path()
        };
        self.go(start).await;

        loop {
            print!("\n{}> ", self.dashboard.page().route().path());
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await.context("Failed to read from stdin")? else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            let command = match parse_command(&line) {
                Ok(command) => command,
                Err(message) => {
                    println!("⚠️  {}", message);
                    continue;
                }
            };
            debug!(?command, "Shell command");

            if command == ShellCommand::Quit {
                println!("👋 Goodbye!");
                break;
            }
            self.execute(command, &mut lines).await?;
            self.report_session_change();
        }

        Ok(())
    }

    async fn execute(
        &mut self,
        command: ShellCommand,
        lines: &mut Lines<BufReader<Stdin>>,
    ) -> Result<()> {
        match command {
            ShellCommand::Go(path) => self.go(&path).await,
            ShellCommand::Search(term) => {
                if self.dashboard.page_mut().set_search(&term) {
                    self.show();
                } else {
                    println!("⚠️  This page has no search");
                }
            }
            ShellCommand::Status(filter) => match self.dashboard.page_mut() {
                Page::Requests(view) => {
                    view.set_status_filter(filter);
                    self.show();
                }
                _ => println!("⚠️  Status filters live on {}", AppRoute::Requests.path()),
            },
            ShellCommand::Tab(tab) => match self.dashboard.page_mut() {
                Page::AdminRequests(view) => {
                    view.set_tab(tab);
                    self.show();
                }
                _ => println!("⚠️  Tabs live on {}", AppRoute::AdminRequests.path()),
            },
            ShellCommand::Next => {
                self.dashboard.page_mut().next_page();
                self.show();
            }
            ShellCommand::Prev => {
                self.dashboard.page_mut().prev_page();
                self.show();
            }
            ShellCommand::Page(number) => {
                self.dashboard.page_mut().go_to_page(number);
                self.show();
            }
            ShellCommand::Request { license, comment } => {
                match self.dashboard.open_request(&license, &comment) {
                    Ok(()) => {
                        let outcome = self.dashboard.submit_request().await?;
                        render::print_outcome("License request", &outcome);
                    }
                    Err(e) => println!("❌ {}", e.user_message()),
                }
            }
            ShellCommand::Decide {
                action,
                request_id,
                comment,
            } => {
                match self.dashboard.open_decision(&request_id, action, &comment) {
                    Ok(()) => {
                        let outcome = self.dashboard.confirm_decision().await?;
                        if outcome == MutationOutcome::Skipped {
                            println!("⚠️  A comment is required to {} a request", action);
                        } else {
                            render::print_outcome(&format!("Request {}", request_id), &outcome);
                            self.show();
                        }
                    }
                    Err(e) => println!("❌ {}", e.user_message()),
                }
            }
            ShellCommand::Refresh => {
                self.dashboard.refresh().await;
                self.show();
            }
            ShellCommand::Nav => {
                render::print_sidebar(&self.dashboard.navigation(), self.dashboard.page());
            }
            ShellCommand::Whoami => render::print_session(self.dashboard.session()),
            ShellCommand::Login(email) => {
                print!("🔑 Password: ");
                std::io::stdout().flush()?;
                let password = lines
                    .next_line()
                    .await
                    .context("Failed to read from stdin")?
                    .unwrap_or_default();

                self.dashboard
                    .set_credential(CredentialField::Email, &email)?;
                self.dashboard
                    .set_credential(CredentialField::Password, &password)?;
                match self.dashboard.login().await {
                    Ok(nav) => {
                        render::print_navigation(&nav);
                        self.show();
                    }
                    Err(e) => report_login_failure(&e),
                }
            }
            ShellCommand::Logout => {
                let nav = self.dashboard.logout().await?;
                render::print_navigation(&nav);
                self.show();
            }
            ShellCommand::Help => print_help(),
            ShellCommand::Quit => {}
        }
        Ok(())
    }

    async fn go(&mut self, path: &str) {
        let nav = self.dashboard.navigate(path).await;
        render::print_navigation(&nav);
        self.show();
    }

    fn show(&self) {
        render::print_page(self.dashboard.page());
    }

    fn report_session_change(&mut self) {
        if !self.session_rx.has_changed().unwrap_or(false) {
            return;
        }
        let session = self.session_rx.borrow_and_update().clone();
        // Credential drafts publish too; only report login transitions
        if session.is_logged_in == self.logged_in {
            return;
        }
        self.logged_in = session.is_logged_in;
        if session.is_logged_in {
            println!("🔓 Signed in as {}", session.email);
        } else {
            println!("🔒 Signed out");
        }
        render::print_sidebar(&self.dashboard.navigation(), self.dashboard.page());
    }
}

fn print_help() {
    println!("📖 Commands:");
    println!("  go <path>                      open a page such as /requests");
    println!("  search <term>                  filter the current list (empty clears)");
    println!("  status <all|pending|accepted|rejected>");
    println!("  tab <pending|processed>");
    println!("  next | prev | page <n>         paginate");
    println!("  request <license> [-- comment] request a license; quoting the name also works");
    println!("  accept|reject <id> <comment>   review a pending request");
    println!("  refresh | nav | whoami");
    println!("  login <email> | logout");
    println!("  quit");
}
