/// One parsed chat line.
///
/// `command` is `None` when the line carried chat text that did not start
/// with the trigger character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub sender: String,
    pub command: Option<String>,
    pub argument: String,
    pub raw: String,
}

impl Message {
    pub fn new(sender: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            command: None,
            argument: String::new(),
            raw: raw.into(),
        }
    }

    pub fn with_command(mut self, command: impl Into<String>, argument: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self.argument = argument.into();
        self
    }

    #[cfg(test)]
    pub fn is_command(&self) -> bool {
        self.command.is_some()
    }
}
