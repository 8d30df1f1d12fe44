use clap::{Parser, Subcommand};
use coursely::auth::{FileSession, SessionStore};
use coursely::client::{ApiBase, ApiClient, CurriculumApi, RequestError};
use coursely::config::find_session_file;
use coursely::curriculum::from_nested;
use coursely::dashboard::{AdminDashboard, InstructorDashboard, StudentDashboard};
use coursely::editor::CurriculumEditor;
use coursely::error::AppResult;
use coursely::model::entity::{
    ContentBlock, CourseDraft, CourseLevel, CourseQuery, Credentials, LessonDraft, Registration,
    SectionDraft, UserRole,
};
use coursely::web::dto::catalog::CourseDetail;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(about = "CLI client for the course API", long_about = None)]
pub struct Cli {
    /// Origin of the course API, without the `/api/v1` prefix
    #[arg(long, env = "API_URL", default_value = "http://127.0.0.1:4000")]
    pub api_url: String,

    /// Where the session is kept between invocations
    #[arg(long, env = "COURSELY_SESSION")]
    pub session: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Create an account and sign in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "student")]
        role: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Browse and manage courses
    Course {
        #[command(subcommand)]
        action: CourseCommands,
    },

    /// Manage the sections of a course
    Section {
        #[command(subcommand)]
        action: SectionCommands,
    },

    /// Manage the lessons of a course
    Lesson {
        #[command(subcommand)]
        action: LessonCommands,
    },

    /// Show a dashboard
    Dashboard {
        #[command(subcommand)]
        which: DashboardCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum CourseCommands {
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        level: Option<CourseLevel>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Course with its curriculum
    Show { id: String },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long, default_value_t = 0.0)]
        price: f64,
        #[arg(long, default_value = "beginner")]
        level: CourseLevel,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value_t = false)]
        publish: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum SectionCommands {
    Add {
        course_id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// Defaults to after the last section
        #[arg(long)]
        order: Option<i32>,
    },
    Rm { course_id: String, section_id: String },
}

#[derive(Subcommand, Debug)]
pub enum LessonCommands {
    Add {
        course_id: String,
        section_id: String,
        #[arg(long)]
        title: String,
        /// Path to a Markdown file with the lesson text
        #[arg(long)]
        file: Option<String>,
        /// Video links, shown after the text
        #[arg(long)]
        video: Vec<String>,
        /// Minutes
        #[arg(long)]
        duration: Option<u32>,
        #[arg(long, default_value_t = false)]
        preview: bool,
    },
    Rm { course_id: String, lesson_id: String },
}

#[derive(Subcommand, Debug)]
pub enum DashboardCommands {
    Student,
    Instructor,
    Admin,
}

fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    let text = serde_json::to_string_pretty(value).map_err(RequestError::from)?;
    println!("{text}");
    Ok(())
}

async fn open_editor(
    api: ApiClient<FileSession>,
    course_id: String,
) -> AppResult<CurriculumEditor<ApiClient<FileSession>>> {
    let mut editor = CurriculumEditor::new(api, course_id);
    editor.load().await?;
    Ok(editor)
}

#[tokio::main]
async fn main() -> AppResult<()> {
    coursely::setup_trace();
    let args = Cli::parse();

    let base = ApiBase::new(&format!("{}/api/v1", args.api_url.trim_end_matches('/')))?;
    let session = FileSession::new(args.session.unwrap_or_else(find_session_file));
    let api = base.client(session);

    match args.command {
        Commands::Login { email, password } => {
            let credentials = Credentials { email, password };
            credentials.validate()?;
            let user = api.sign_in(&credentials).await?;
            println!("Signed in as {} ({})", user.name, user.role);
        }

        Commands::Register {
            name,
            email,
            password,
            role,
        } => {
            let registration = Registration {
                name,
                email,
                password,
                role: UserRole::from(role.as_str()),
            };
            registration.validate()?;
            let user = api.register(&registration).await?;
            println!("Registered {} ({})", user.email, user.role);
        }

        Commands::Logout => {
            api.sign_out()?;
            println!("Signed out");
        }

        Commands::Whoami => {
            if api.session().token()?.is_none() {
                println!("Not signed in");
            } else {
                print_json(&api.refresh_profile().await?)?;
            }
        }

        Commands::Course { action } => match action {
            CourseCommands::List {
                category,
                level,
                search,
            } => {
                let query = CourseQuery {
                    category,
                    level,
                    search,
                };
                for course in api.courses(&query).await? {
                    println!("{}\t{}\t{:?}\t{:.2}", course.id, course.title, course.level, course.price);
                }
            }

            CourseCommands::Show { id } => {
                let course = api.course(&id).await?;
                let sections = api.list_sections(&id).await?;
                print_json(&CourseDetail {
                    course,
                    curriculum: from_nested(sections).into(),
                })?;
            }

            CourseCommands::Create {
                title,
                description,
                price,
                level,
                category,
                publish,
            } => {
                let draft = CourseDraft {
                    title,
                    description,
                    price,
                    level,
                    category,
                    requirements: Vec::new(),
                    outcomes: Vec::new(),
                    is_published: Some(publish),
                    image: None,
                };
                draft.validate()?;
                let course = api.create_course(&draft).await?;
                println!("Course created: {}", course.id);
            }
        },

        Commands::Section { action } => match action {
            SectionCommands::Add {
                course_id,
                title,
                description,
                order,
            } => {
                let mut editor = open_editor(api, course_id).await?;
                let section = editor
                    .create_section(SectionDraft {
                        title,
                        description,
                        order,
                        is_published: None,
                    })
                    .await?;
                println!("Section created: {} (order {})", section.id, section.order);
            }

            SectionCommands::Rm {
                course_id,
                section_id,
            } => {
                let mut editor = open_editor(api, course_id).await?;
                editor.delete_section(&section_id).await?;
                println!("Section deleted: {section_id}");
            }
        },

        Commands::Lesson { action } => match action {
            LessonCommands::Add {
                course_id,
                section_id,
                title,
                file,
                video,
                duration,
                preview,
            } => {
                let mut content = Vec::new();
                if let Some(file) = file {
                    content.push(ContentBlock::Text {
                        content: std::fs::read_to_string(file)?,
                        order: 0,
                    });
                }
                let offset = content.len() as i32;
                content.extend(video.into_iter().enumerate().map(|(i, url)| {
                    ContentBlock::VideoLink {
                        content: url,
                        order: offset + i as i32,
                    }
                }));

                let mut draft = LessonDraft::new(title);
                draft.content = content;
                draft.duration = duration;
                draft.is_preview = Some(preview);

                let mut editor = open_editor(api, course_id).await?;
                let lesson = editor.create_lesson(&section_id, draft).await?;
                println!("Lesson created: {} (order {})", lesson.id, lesson.order);
            }

            LessonCommands::Rm {
                course_id,
                lesson_id,
            } => {
                let mut editor = open_editor(api, course_id).await?;
                editor.delete_lesson(&lesson_id).await?;
                println!("Lesson deleted: {lesson_id}");
            }
        },

        Commands::Dashboard { which } => match which {
            DashboardCommands::Student => {
                let dashboard = StudentDashboard::load(&api).await?;
                for card in dashboard.stat_cards() {
                    println!("{:<24}{}", card.label, card.value);
                }
                for enrolled in &dashboard.courses {
                    println!("{:<24}{}%", enrolled.course.title, enrolled.progress());
                }
            }
            DashboardCommands::Instructor => {
                let dashboard = InstructorDashboard::load(&api).await?;
                for card in dashboard.stat_cards() {
                    println!("{:<24}{}", card.label, card.value);
                }
            }
            DashboardCommands::Admin => {
                let dashboard = AdminDashboard::load(&api).await?;
                for card in dashboard.stat_cards() {
                    println!("{:<24}{}", card.label, card.value);
                }
            }
        },
    }

    Ok(())
}
