use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskmap::client::{BoardClient, ClientError};
use taskmap::config::{config_path, ClientConfig};
use taskmap::filter::{self, Choice, ProjectFilter, ProjectSort, TaskFilter, TaskStats};
use taskmap::forms::{self, ProjectForm, SignupForm, TaskForm};
use taskmap::mapping::MappingSubmitter;
use taskmap::models::*;
use taskmap::session::{SessionContext, SessionStore};
use taskmap::view::TasksView;
use taskmap::{board, render};

#[derive(Parser)]
#[command(name = "taskmap")]
#[command(about = "Map project tasks to team members from the terminal")]
struct Cli {
    /// Backend base URL (overrides config and TASKMAP_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Check with the backend whether the stored session is still valid
    Whoami,
    /// Create an employee account
    Signup {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
        #[arg(long)]
        company: String,
        #[arg(long)]
        job_role: String,
        /// Repeat for several skills
        #[arg(long = "skill")]
        skills: Vec<String>,
        #[arg(long)]
        years_of_experience: String,
    },
    /// Browse and edit projects
    Projects {
        #[command(subcommand)]
        command: ProjectCommand,
    },
    /// Browse and edit tasks
    Tasks {
        #[command(subcommand)]
        command: TaskCommand,
    },
    /// Browse team members
    Employees {
        #[command(subcommand)]
        command: EmployeeCommand,
    },
    /// Map tasks of a project to team members in one request
    Map {
        project: ProjectId,
        /// Repeat for several tasks
        #[arg(long = "task", required_unless_present = "employees")]
        tasks: Vec<TaskId>,
        /// Repeat for several team members
        #[arg(long = "employee")]
        employees: Vec<EmployeeId>,
    },
    /// Open the interactive task board for a project
    Board { project: ProjectId },
    /// Inspect or write the client configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Write the effective configuration to the config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum ProjectCommand {
    List {
        #[arg(short, long, default_value = "")]
        search: String,
        #[arg(long, default_value = "all")]
        status: Choice<ProjectStatus>,
        #[arg(long, default_value = "all")]
        priority: Choice<Priority>,
        #[arg(long, default_value = "name")]
        sort: ProjectSort,
    },
    Show {
        id: ProjectId,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        priority: Priority,
        /// YYYY-MM-DD
        #[arg(long)]
        due: NaiveDate,
        /// Repeat for several members
        #[arg(long = "member")]
        members: Vec<String>,
    },
    Update {
        id: ProjectId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<ProjectStatus>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        due: Option<NaiveDate>,
    },
}

#[derive(Subcommand)]
enum EmployeeCommand {
    List {
        /// Filter by first name
        #[arg(short, long, default_value = "")]
        search: String,
    },
}

#[derive(Subcommand)]
enum TaskCommand {
    List {
        project: ProjectId,
        #[arg(short, long, default_value = "")]
        search: String,
        #[arg(long, default_value = "all")]
        status: Choice<TaskStatus>,
        #[arg(long, default_value = "all")]
        priority: Choice<Priority>,
    },
    Show {
        id: TaskId,
    },
    Create {
        project: ProjectId,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        priority: Priority,
        #[arg(long, default_value = "todo")]
        status: TaskStatus,
        /// YYYY-MM-DD
        #[arg(long)]
        due: NaiveDate,
    },
    Update {
        id: TaskId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        due: Option<NaiveDate>,
    },
}

/// Initialize tracing on stderr so stdout only carries command output.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "taskmap=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Everything a command needs: config, the session and a client carrying it.
struct App {
    config: ClientConfig,
    store: SessionStore,
    session: SessionContext,
    client: BoardClient,
}

impl App {
    fn open(url: Option<String>) -> anyhow::Result<Self> {
        let mut config = ClientConfig::load();
        if let Some(url) = url {
            config.base_url = url;
        }
        let store = SessionStore::new(config.session_path()?);
        let session = store.load()?;
        let client = BoardClient::new(&config.base_url)
            .with_context(|| format!("Failed to create client for {}", config.base_url))?;
        session.attach(&client);
        Ok(Self {
            config,
            store,
            session,
            client,
        })
    }

    /// Route guard for protected commands.
    fn guard(&self) -> anyhow::Result<()> {
        self.session.require()?;
        Ok(())
    }

    /// Pass a backend result through, invalidating the stored session on 401/403.
    fn check<T>(&mut self, result: Result<T, ClientError>) -> anyhow::Result<T> {
        match result {
            Ok(value) => Ok(value),
            Err(e) => {
                if self.session.observe(&e) {
                    self.store.save(&self.session)?;
                }
                Err(e.into())
            }
        }
    }

    fn persist(&self) -> anyhow::Result<()> {
        self.store.save(&self.session)?;
        Ok(())
    }
}

fn form_error(errors: &forms::FormErrors) -> anyhow::Error {
    anyhow::anyhow!("Invalid input:\n{}", forms::describe(errors))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut app = App::open(cli.url)?;

    match cli.command {
        Commands::Login { email, password } => {
            let input = LoginInput { email, password };
            let session = SessionContext::login(&app.client, &input).await?;
            app.session = session;
            app.persist()?;
            println!("Logged in as {}", input.email);
        }
        Commands::Logout => {
            app.store.clear()?;
            println!("Logged out");
        }
        Commands::Whoami => {
            let probe = app.config.session_probe_path.clone();
            let valid = app.session.refresh(&app.client, &probe).await?;
            app.persist()?;
            if valid {
                println!("Authenticated against {}", app.client.base_url());
            } else {
                println!("Not logged in");
            }
        }
        Commands::Signup {
            first_name,
            last_name,
            email,
            password,
            confirm_password,
            company,
            job_role,
            skills,
            years_of_experience,
        } => {
            let form = SignupForm {
                first_name,
                last_name,
                email,
                password,
                confirm_password,
                company,
                job_role,
                skills,
                years_of_experience,
            };
            let input = form.into_input().map_err(|e| form_error(&e))?;
            app.client.signup(&input).await?;
            println!("Account created for {}", input.email);
        }
        Commands::Projects { command } => {
            app.guard()?;
            run_project_command(&mut app, command).await?;
        }
        Commands::Tasks { command } => {
            app.guard()?;
            run_task_command(&mut app, command).await?;
        }
        Commands::Employees {
            command: EmployeeCommand::List { search },
        } => {
            app.guard()?;
            let result = app.client.get_employees().await;
            let employees = app.check(result)?;
            for employee in filter::filter_employees(&employees, &search) {
                println!("{}", render::render_employee_line(employee, false));
            }
        }
        Commands::Map {
            project,
            tasks,
            employees,
        } => {
            app.guard()?;
            let submitter = MappingSubmitter::new(app.config.clear_policy);
            let mut view = TasksView::new(project, app.session.clone(), submitter);
            let result = view.map_ids(&app.client, &tasks, &employees).await;
            app.session = view.session().clone();
            app.persist()?;
            result?;
            println!("Mapping submitted");
        }
        Commands::Board { project } => {
            app.guard()?;
            let submitter = MappingSubmitter::new(app.config.clear_policy);
            let mut view = TasksView::new(project, app.session.clone(), submitter);
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            board::run(&app.client, &mut view, stdin, &mut stdout).await?;
            app.session = view.session().clone();
            app.persist()?;
        }
        Commands::Config { command } => match command {
            ConfigCommand::Show => {
                println!("{}", serde_json::to_string_pretty(&app.config)?);
                println!("Session file: {}", app.store.path().display());
            }
            ConfigCommand::Init { force } => {
                let path = config_path()?;
                if path.exists() && !force {
                    bail!("{} already exists; pass --force to overwrite", path.display());
                }
                app.config.save_to(&path)?;
                println!("Wrote {}", path.display());
            }
        },
    }

    Ok(())
}

async fn run_project_command(app: &mut App, command: ProjectCommand) -> anyhow::Result<()> {
    match command {
        ProjectCommand::List {
            search,
            status,
            priority,
            sort,
        } => {
            let result = app.client.get_projects().await;
            let projects = app.check(result)?;
            let filter = ProjectFilter {
                search,
                status,
                priority,
                sort,
            };
            for project in filter::filter_projects(&projects, &filter) {
                println!("{}", render::render_project_line(project));
            }
        }
        ProjectCommand::Show { id } => {
            let result = app.client.get_project(id).await;
            let project = app.check(result)?;
            print!("{}", render::render_project_detail(&project));
        }
        ProjectCommand::Create {
            name,
            description,
            priority,
            due,
            members,
        } => {
            let form = ProjectForm {
                name,
                description,
                priority: Some(priority),
                due_date: Some(due),
                team_members: members,
            };
            let input = form.into_input().map_err(|e| form_error(&e))?;
            let result = app.client.create_project(&input).await;
            app.check(result)?;
            println!("Project '{}' created", input.project_name);
        }
        ProjectCommand::Update {
            id,
            name,
            description,
            status,
            priority,
            due,
        } => {
            let result = app.client.get_project(id).await;
            let project = app.check(result)?;
            let mut input = UpdateProjectInput::from(&project);
            if let Some(name) = name {
                input.project_name = name;
            }
            if let Some(description) = description {
                input.project_desc = description;
            }
            if let Some(status) = status {
                input.status = status;
            }
            if let Some(priority) = priority {
                input.priority = priority;
            }
            if due.is_some() {
                input.due_date = due;
            }
            let result = app.client.update_project(id, &input).await;
            app.check(result)?;
            println!("Project #{} updated", id);
        }
    }
    Ok(())
}

async fn run_task_command(app: &mut App, command: TaskCommand) -> anyhow::Result<()> {
    match command {
        TaskCommand::List {
            project,
            search,
            status,
            priority,
        } => {
            let result = app.client.get_tasks(project).await;
            let tasks = app.check(result)?;
            let filter = TaskFilter {
                search,
                status,
                priority,
            };
            println!("{}", render::render_stats(&TaskStats::of(&tasks)));
            for task in filter::filter_tasks(&tasks, &filter) {
                println!("{}", render::render_task_line(task, false));
            }
        }
        TaskCommand::Show { id } => {
            let result = app.client.get_task(id).await;
            let task = app.check(result)?;
            print!("{}", render::render_task_detail(&task));
        }
        TaskCommand::Create {
            project,
            title,
            description,
            priority,
            status,
            due,
        } => {
            let form = TaskForm {
                title,
                description,
                priority: Some(priority),
                status,
                due_date: Some(due),
            };
            let today = chrono::Local::now().date_naive();
            let input = form.into_input(today).map_err(|e| form_error(&e))?;
            let result = app.client.create_task(project, &input).await;
            app.check(result)?;
            println!("Task '{}' created in project #{}", input.task_title, project);
        }
        TaskCommand::Update {
            id,
            title,
            description,
            status,
            priority,
            due,
        } => {
            let result = app.client.get_task(id).await;
            let task = app.check(result)?;
            let mut input = UpdateTaskInput::from(&task);
            if let Some(title) = title {
                input.task_title = title;
            }
            if let Some(description) = description {
                input.description = description;
            }
            if let Some(status) = status {
                input.status = status;
            }
            if let Some(priority) = priority {
                input.priority = priority;
            }
            if due.is_some() {
                input.due_date = due;
            }
            let result = app.client.update_task(id, &input).await;
            app.check(result)?;
            println!("Task #{} updated", id);
        }
    }
    Ok(())
}
