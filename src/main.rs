use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::rolling;

use hrm_admin::{
    AdminConsole, Config, Outcome, Screen,
    model::{
        employee::{EmployeeNumber, NewEmployee},
        payroll::YearMonth,
    },
    view::{
        NoticeLevel, Row,
        employee::EmployeeForm,
    },
};

/// hrm-admin - employee management console
#[derive(Parser, Debug)]
#[command(name = "hrm-admin")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in and store the session
    Login {
        username: String,
        #[arg(long, env = "HRM_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Register a new account (requires login)
    Register {
        username: String,
        #[arg(long, env = "HRM_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// List employees
    #[command(alias = "ls")]
    List,

    /// Show one employee
    Show { employee_number: String },

    /// Create an employee from a JSON file
    Create {
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Update fields of an employee
    Update {
        employee_number: String,

        /// field=value, e.g. basicSalary=55000. Repeatable. An empty value sends null
        #[arg(short, long = "set", required = true)]
        sets: Vec<String>,

        /// Send the whole record (fetched first) instead of only the changed fields
        #[arg(long)]
        full: bool,
    },

    /// Delete an employee
    Delete {
        employee_number: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// List payroll months
    Cutoffs,

    /// Show the monthly salary calculation
    Salary {
        employee_number: String,
        /// YYYY-MM, defaults to the latest cutoff
        #[arg(short, long)]
        month: Option<YearMonth>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "hrm-admin.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    info!(base_url = %config.api_base_url, "hrm-admin starting");

    let console = AdminConsole::new(&config)?;
    let outcome = run(&console, cli.command).await?;
    Ok(report(&outcome))
}

async fn run(console: &AdminConsole, command: Commands) -> Result<Outcome> {
    let outcome = match command {
        Commands::Login { username, password } => console.login(&username, &password).await,
        Commands::Logout => console.logout(),
        Commands::Register { username, password } => {
            console.register(&username, &password).await
        }
        Commands::List => console.employees().await,
        Commands::Show { employee_number } => {
            console
                .employee_detail(&EmployeeNumber::new(employee_number))
                .await
        }
        Commands::Create { file } => {
            let json = fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let employee: NewEmployee = serde_json::from_str(&json)
                .with_context(|| format!("parsing {}", file.display()))?;
            console.create_employee(&employee).await
        }
        Commands::Update {
            employee_number,
            sets,
            full,
        } => {
            let number = EmployeeNumber::new(employee_number);
            let mut form = if full {
                match console.edit_form(&number).await {
                    Ok(form) => form,
                    Err(outcome) => return Ok(outcome),
                }
            } else {
                EmployeeForm::blank()
            };
            for pair in &sets {
                form.set_pair(pair)?;
            }
            for (field, value) in form.preview(console.currency()) {
                eprintln!("{} = {}", field.as_ref(), value);
            }
            let update = if full {
                form.to_update()?
            } else {
                form.to_partial_update()?
            };
            console.update_employee(&number, &update).await
        }
        Commands::Delete {
            employee_number,
            yes,
        } => {
            if !yes {
                bail!(
                    "refusing to delete employee {} without --yes",
                    employee_number
                );
            }
            console
                .delete_employee(&EmployeeNumber::new(employee_number))
                .await
        }
        Commands::Cutoffs => console.cutoffs().await,
        Commands::Salary {
            employee_number,
            month,
        } => {
            console
                .salary(&EmployeeNumber::new(employee_number), month)
                .await
        }
    };
    Ok(outcome)
}

fn report(outcome: &Outcome) -> ExitCode {
    print_screen(&outcome.screen);

    if let Some(notice) = &outcome.notice {
        eprintln!("[{}] {}", notice.level, notice.message);
    }
    eprintln!("-> {}", outcome.route);

    match &outcome.notice {
        Some(n) if n.level == NoticeLevel::Error => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    }
}

fn print_row(row: &Row) {
    println!("{}: {}", row.label, row.value);
}

fn print_screen(screen: &Screen) {
    match screen {
        Screen::Blank => {}
        Screen::EmployeeList(list) => {
            for row in &list.rows {
                println!(
                    "{}\t{}\tSSS {}\tPhilHealth {}\tTIN {}\tPag-IBIG {}",
                    row.employee_number,
                    row.name,
                    row.sss_number,
                    row.philhealth_number,
                    row.tin_number,
                    row.pagibig_number
                );
            }
        }
        Screen::EmployeeDetail(detail) => {
            println!("{} ({})", detail.name, detail.employee_number);
            if detail.is_current_user {
                println!("(your record)");
            }
            for section in &detail.sections {
                println!();
                println!("{}", section.title);
                section.rows.iter().for_each(print_row);
            }
        }
        Screen::Cutoffs(options) => {
            for option in options {
                println!("{}", option.label);
            }
        }
        Screen::Salary(salary) => {
            println!("Salary for {}", salary.year_month);
            salary.rows().into_iter().for_each(print_row);
        }
    }
}
