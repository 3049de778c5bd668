use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_ftpcommand::{cdup, cwd, feat, list, noop, pass, pwd, quit, syst, type_, user};
use crate::core_network::pasv;
use crate::session::Session;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<(), std::io::Error>> + Send + 'a>>;

/// A verb handler gets the session and the argument text following the verb.
pub type CommandHandler = fn(&mut Session, String) -> HandlerFuture<'_>;

macro_rules! handler {
    ($handle:path) => {{
        fn call(session: &mut Session, arg: String) -> HandlerFuture<'_> {
            Box::pin($handle(session, arg))
        }
        call as CommandHandler
    }};
}

/// Read-only mapping from verb to handler, built once at startup and shared
/// by every session without locking.
pub struct CommandTable {
    handlers: HashMap<&'static str, CommandHandler>,
}

impl CommandTable {
    /// Exact, case-sensitive lookup.
    pub fn resolve(&self, verb: &str) -> Option<CommandHandler> {
        self.handlers.get(verb).copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.handlers.len()
    }
}

fn handler_for(command: FtpCommand) -> CommandHandler {
    match command {
        FtpCommand::USER => handler!(user::handle_user_command),
        FtpCommand::PASS => handler!(pass::handle_pass_command),
        FtpCommand::SYST => handler!(syst::handle_syst_command),
        FtpCommand::FEAT => handler!(feat::handle_feat_command),
        FtpCommand::PWD => handler!(pwd::handle_pwd_command),
        FtpCommand::QUIT => handler!(quit::handle_quit_command),
        FtpCommand::TYPE => handler!(type_::handle_type_command),
        FtpCommand::PASV => handler!(pasv::handle_pasv_command),
        FtpCommand::LIST => handler!(list::handle_list_command),
        FtpCommand::CWD => handler!(cwd::handle_cwd_command),
        FtpCommand::CDUP => handler!(cdup::handle_cdup_command),
        FtpCommand::NOOP => handler!(noop::handle_noop_command),
    }
}

pub fn initialize_command_handlers() -> CommandTable {
    let handlers = FtpCommand::ALL
        .iter()
        .map(|command| (command.as_str(), handler_for(*command)))
        .collect();
    CommandTable { handlers }
}
