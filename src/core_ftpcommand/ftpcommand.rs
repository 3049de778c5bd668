use std::fmt;

/// Verbs the server dispatches. Anything else gets a 502.
#[derive(Eq, Hash, PartialEq, Debug, Clone, Copy)]
pub enum FtpCommand {
    USER,
    PASS,
    SYST,
    FEAT,
    PWD,
    QUIT,
    TYPE,
    PASV,
    LIST,
    CWD,
    CDUP,
    NOOP,
}

impl FtpCommand {
    pub const ALL: [FtpCommand; 12] = [
        FtpCommand::USER,
        FtpCommand::PASS,
        FtpCommand::SYST,
        FtpCommand::FEAT,
        FtpCommand::PWD,
        FtpCommand::QUIT,
        FtpCommand::TYPE,
        FtpCommand::PASV,
        FtpCommand::LIST,
        FtpCommand::CWD,
        FtpCommand::CDUP,
        FtpCommand::NOOP,
    ];

    /// The verb exactly as it must appear on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            FtpCommand::USER => "USER",
            FtpCommand::PASS => "PASS",
            FtpCommand::SYST => "SYST",
            FtpCommand::FEAT => "FEAT",
            FtpCommand::PWD => "PWD",
            FtpCommand::QUIT => "QUIT",
            FtpCommand::TYPE => "TYPE",
            FtpCommand::PASV => "PASV",
            FtpCommand::LIST => "LIST",
            FtpCommand::CWD => "CWD",
            FtpCommand::CDUP => "CDUP",
            FtpCommand::NOOP => "NOOP",
        }
    }
}

impl fmt::Display for FtpCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
