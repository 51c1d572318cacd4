use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;
use dialoguer::Password;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use super::chat;
use super::AppContext;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::ConversationUpdate;
use crate::domain::models::NewConversation;
use crate::domain::models::RegisterRequest;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let mut file = fs::File::create(config_file_path.clone()).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

fn prompt_text(matches: &ArgMatches, name: &str, prompt: &str) -> Result<String> {
    if let Some(val) = matches.get_one::<String>(name) {
        return Ok(val.to_string());
    }

    let val = Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .interact_text()?;

    return Ok(val);
}

fn prompt_password(matches: &ArgMatches) -> Result<String> {
    if let Some(val) = matches.get_one::<String>("password") {
        return Ok(val.to_string());
    }

    let val = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Password")
        .interact()?;

    return Ok(val);
}

fn arg_username() -> Arg {
    return Arg::new("username")
        .short('u')
        .long("username")
        .num_args(1)
        .help("Account username. Prompted for when omitted.");
}

fn arg_password() -> Arg {
    return Arg::new("password")
        .short('p')
        .long("password")
        .env("CHATWIRE_PASSWORD")
        .hide_env_values(true)
        .num_args(1)
        .help("Account password. Prompted for when omitted.");
}

fn arg_chat_id() -> Arg {
    return Arg::new("chat")
        .short('i')
        .long("chat")
        .help("Conversation ID")
        .num_args(1)
        .required(true);
}

fn arg_page() -> Arg {
    return Arg::new("page")
        .long("page")
        .num_args(1)
        .default_value("1")
        .value_parser(value_parser!(u32).range(1..))
        .help("Page to list.");
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_login() -> Command {
    return Command::new("login")
        .about("Log in and store the session credentials.")
        .arg(arg_username())
        .arg(arg_password());
}

fn subcommand_register() -> Command {
    return Command::new("register")
        .about("Create a new account.")
        .arg(arg_username())
        .arg(arg_password())
        .arg(
            Arg::new("email")
                .short('e')
                .long("email")
                .num_args(1)
                .help("Account email. Prompted for when omitted."),
        )
        .arg(
            Arg::new("full-name")
                .long("full-name")
                .num_args(1)
                .help("Display name for the account."),
        );
}

fn subcommand_chats() -> Command {
    return Command::new("chats")
        .about("Manage conversations.")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("list")
                .about("List conversations with their ids and models.")
                .arg(arg_page()),
        )
        .subcommand(
            Command::new("create")
                .about("Start a new conversation.")
                .arg(
                    Arg::new("title")
                        .short('t')
                        .long("title")
                        .num_args(1)
                        .required(true)
                        .help("Conversation title"),
                )
                .arg(
                    Arg::new("model")
                        .short('m')
                        .long("model")
                        .num_args(1)
                        .help("Model to answer in this conversation. Defaults to the first model listed by `chatwire models`."),
                )
                .arg(
                    Arg::new("system-prompt")
                        .long("system-prompt")
                        .num_args(1)
                        .help("System prompt for the conversation."),
                ),
        )
        .subcommand(
            Command::new("rename")
                .about("Rename a conversation.")
                .arg(arg_chat_id())
                .arg(
                    Arg::new("title")
                        .short('t')
                        .long("title")
                        .num_args(1)
                        .required(true)
                        .help("New title"),
                ),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a conversation and its messages.")
                .arg(arg_chat_id()),
        );
}

fn subcommand_messages() -> Command {
    return Command::new("messages")
        .about("Print the latest messages of a conversation.")
        .arg(arg_chat_id());
}

fn subcommand_send() -> Command {
    return Command::new("send")
        .about("Send a message and stream the reply to stdout.")
        .arg(arg_chat_id())
        .arg(
            Arg::new("text")
                .help("Message text")
                .num_args(1..)
                .required(true),
        );
}

fn arg_config(key: ConfigKey, env: &'static str, help: &str) -> Arg {
    return Arg::new(key.to_string())
        .long(key.to_string())
        .env(env)
        .num_args(1)
        .help(format!("{help} [default: {}]", Config::default(key)))
        .global(true);
}

pub fn build() -> Command {
    let about = format!(
        "{}\n\nVersion: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
    );

    return Command::new("chatwire")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(true)
        .subcommand(subcommand_login())
        .subcommand(subcommand_register())
        .subcommand(Command::new("logout").about("Forget the stored session credentials."))
        .subcommand(Command::new("whoami").about("Print the logged in user."))
        .subcommand(subcommand_chats())
        .subcommand(Command::new("models").about("List the models the server can answer with."))
        .subcommand(subcommand_messages())
        .subcommand(subcommand_send())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("CHATWIRE_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(
            arg_config(ConfigKey::ApiUrl, "CHATWIRE_API_URL", "Base URL of the chat service API.")
                .short('a'),
        )
        .arg(arg_config(
            ConfigKey::CredentialsFile,
            "CHATWIRE_CREDENTIALS_FILE",
            "Where the session credentials are stored.",
        ))
        .arg(arg_config(
            ConfigKey::MessagesPageSize,
            "CHATWIRE_MESSAGES_PAGE_SIZE",
            "Number of messages fetched per conversation.",
        ))
        .arg(arg_config(
            ConfigKey::ChatsPageSize,
            "CHATWIRE_CHATS_PAGE_SIZE",
            "Number of conversations fetched per page.",
        ))
        .arg(arg_config(
            ConfigKey::RequestTimeout,
            "CHATWIRE_REQUEST_TIMEOUT",
            "Time to wait in milliseconds for non-streaming requests.",
        ))
        .arg(arg_config(
            ConfigKey::StreamIdleTimeout,
            "CHATWIRE_STREAM_IDLE_TIMEOUT",
            "Time to wait in milliseconds between chunks of a streamed reply.",
        ));
}

async fn run_chats(ctx: &AppContext, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("list", list_matches)) => {
            let page = list_matches.get_one::<u32>("page").copied().unwrap_or(1);
            chat::print_conversations(ctx, page).await?;
        }
        Some(("create", create_matches)) => {
            let chat = chat::create_conversation(
                ctx,
                NewConversation {
                    title: prompt_text(create_matches, "title", "Title")?,
                    model: create_matches.get_one::<String>("model").cloned(),
                    system_prompt: create_matches.get_one::<String>("system-prompt").cloned(),
                },
            )
            .await?;
            println!("Created conversation {} using {}", chat.id, chat.model);
        }
        Some(("rename", rename_matches)) => {
            let chat_id = prompt_text(rename_matches, "chat", "Conversation ID")?;
            let chat = ctx
                .chats
                .update_chat(
                    &chat_id,
                    &ConversationUpdate {
                        title: Some(prompt_text(rename_matches, "title", "Title")?),
                        ..ConversationUpdate::default()
                    },
                )
                .await?;
            println!("Renamed conversation {} to {}", chat.id, chat.title);
        }
        Some(("delete", delete_matches)) => {
            let chat_id = prompt_text(delete_matches, "chat", "Conversation ID")?;
            ctx.chats.delete_chat(&chat_id).await?;
            println!("Deleted conversation {chat_id}");
        }
        _ => {
            subcommand_chats().print_long_help()?;
        }
    }

    return Ok(());
}

fn require_login(ctx: &AppContext) -> Result<()> {
    if !ctx.gateway.credentials().is_authenticated() {
        bail!("You are not logged in. Run `chatwire login` first.");
    }

    return Ok(());
}

async fn run(ctx: &AppContext, matches: &ArgMatches) -> Result<()> {
    if let Some(("whoami" | "chats" | "messages" | "send", _)) = matches.subcommand() {
        require_login(ctx)?;
    }

    match matches.subcommand() {
        Some(("login", login_matches)) => {
            let username = prompt_text(login_matches, "username", "Username")?;
            let password = prompt_password(login_matches)?;
            ctx.auth.login(&username, &password).await?;
            println!("Logged in as {}", Paint::green(username));
        }
        Some(("register", register_matches)) => {
            let req = RegisterRequest {
                username: prompt_text(register_matches, "username", "Username")?,
                email: prompt_text(register_matches, "email", "Email")?,
                password: prompt_password(register_matches)?,
                full_name: register_matches.get_one::<String>("full-name").cloned(),
            };
            let user = ctx.auth.register(&req).await?;
            println!("Registered {}. Run `chatwire login` to start chatting.", user.username);
        }
        Some(("logout", _)) => {
            ctx.auth.logout();
            println!("Logged out");
        }
        Some(("whoami", _)) => {
            let user = ctx.auth.current_user().await?;
            match user.full_name {
                Some(full_name) => println!("{} ({full_name}, {})", user.username, user.email),
                None => println!("{} ({})", user.username, user.email),
            }
        }
        Some(("chats", chats_matches)) => {
            run_chats(ctx, chats_matches).await?;
        }
        Some(("models", _)) => {
            chat::print_models(ctx).await?;
        }
        Some(("messages", messages_matches)) => {
            let chat_id = prompt_text(messages_matches, "chat", "Conversation ID")?;
            chat::print_messages(ctx, &chat_id).await?;
        }
        Some(("send", send_matches)) => {
            let chat_id = prompt_text(send_matches, "chat", "Conversation ID")?;
            let text = send_matches
                .get_many::<String>("text")
                .map(|words| return words.cloned().collect::<Vec<String>>().join(" "))
                .unwrap_or_default();
            chat::send_message(ctx, &chat_id, &text).await?;
        }
        _ => {
            build().print_long_help()?;
        }
    }

    return Ok(());
}

pub async fn parse() -> Result<()> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
            return Ok(());
        }
        Some(("config", subcmd_matches)) => {
            match subcmd_matches.subcommand() {
                Some(("create", _)) => {
                    create_config_file().await?;
                }
                Some(("default", _)) => {
                    println!("{}", Config::serialize_default(build()));
                }
                Some(("path", _)) => {
                    println!("{}", Config::default(ConfigKey::ConfigFile));
                }
                _ => {
                    subcommand_config().print_long_help()?;
                }
            }
            return Ok(());
        }
        Some((_, subcmd_matches)) => {
            Config::load(vec![&matches, subcmd_matches]).await?;
        }
        None => {
            Config::load(vec![&matches]).await?;
        }
    }

    let ctx = AppContext::from_config()?;
    let mut session_ended = ctx.gateway.subscribe_session_ended();
    let res = run(&ctx, &matches).await;

    if session_ended.try_recv().is_ok() {
        eprintln!(
            "{}",
            Paint::yellow("Your session has ended. Run `chatwire login` to sign in again.")
        );
    }

    return res;
}
