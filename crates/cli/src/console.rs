//! Line-oriented console over a [`Service`].

use policy::{Amount, FieldTag, Identity, PolicyId};
use runtime::Service;

use crate::error::{Error, Result};

pub const HELP: &str = "\
commands:
  as <identity>                         act as another caller
  whoami                                show the current caller
  purchase <id> <limit> <payment>       buy a policy as the current caller
  grant <id> <limit|premium> <grantee>  let grantee read one field
  read <id> <limit|premium>             read a field as the current caller
  count                                 total policies purchased
  help                                  show this message
  quit                                  leave the console";

/// One parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    As(Identity),
    WhoAmI,
    Purchase {
        id: PolicyId,
        limit: Amount,
        payment: Amount,
    },
    Grant {
        id: PolicyId,
        field: FieldTag,
        grantee: Identity,
    },
    Read {
        id: PolicyId,
        field: FieldTag,
    },
    Count,
    Help,
    Quit,
}

impl Command {
    /// Parse a line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let words: Vec<&str> = line.split_whitespace().collect();
        let command = match words.as_slice() {
            ["as", who] => Command::As(Identity::new(*who)),
            ["whoami"] => Command::WhoAmI,
            ["purchase", id, limit, payment] => Command::Purchase {
                id: policy_id(id)?,
                limit: amount(limit)?,
                payment: amount(payment)?,
            },
            ["grant", id, field, grantee] => Command::Grant {
                id: policy_id(id)?,
                field: field_tag(field)?,
                grantee: Identity::new(*grantee),
            },
            ["read", id, field] => Command::Read {
                id: policy_id(id)?,
                field: field_tag(field)?,
            },
            ["count"] => Command::Count,
            ["help"] => Command::Help,
            ["quit"] | ["exit"] => Command::Quit,
            [verb, ..] => {
                return Err(Error::Command(format!(
                    "unrecognized command '{line}' ({verb}); try 'help'"
                )));
            }
            [] => return Ok(None),
        };
        Ok(Some(command))
    }
}

fn policy_id(raw: &str) -> Result<PolicyId> {
    raw.parse().map_err(|e: policy::Error| Error::Command(e.to_string()))
}

fn field_tag(raw: &str) -> Result<FieldTag> {
    raw.parse().map_err(|e: policy::Error| Error::Command(e.to_string()))
}

fn amount(raw: &str) -> Result<Amount> {
    raw.parse()
        .map_err(|e| Error::Command(format!("invalid amount '{raw}': {e}")))
}

/// What the console should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Quit,
}

/// Outcome of one script line.
#[derive(Debug)]
pub struct Step {
    pub line: usize,
    pub outcome: Result<Reply>,
}

/// Parse every line of a script. The first unparsable line fails the whole
/// script with its 1-based line number.
pub fn parse_script(script: &str) -> Result<Vec<(usize, Command)>> {
    let mut commands = Vec::new();
    for (index, line) in script.lines().enumerate() {
        match Command::parse(line) {
            Ok(Some(command)) => commands.push((index + 1, command)),
            Ok(None) => {}
            Err(e) => {
                return Err(Error::Script {
                    line: index + 1,
                    message: e.to_string(),
                });
            }
        }
    }
    Ok(commands)
}

/// A caller-switching session against one service.
pub struct Console {
    service: Service,
    caller: Identity,
}

impl Console {
    pub fn new(service: Service, caller: Identity) -> Self {
        Self { service, caller }
    }

    pub fn caller(&self) -> &Identity {
        &self.caller
    }

    /// Run a script: nothing executes unless every line parses. Operation
    /// failures are recorded per line and the script carries on; `quit` ends
    /// it early.
    pub async fn run_script(&mut self, script: &str) -> Result<Vec<Step>> {
        let commands = parse_script(script)?;

        let mut steps = Vec::with_capacity(commands.len());
        for (line, command) in commands {
            let outcome = self.execute(command).await;
            let quit = matches!(outcome, Ok(Reply::Quit));
            steps.push(Step { line, outcome });
            if quit {
                break;
            }
        }
        Ok(steps)
    }

    /// Run one command. Operation failures come back as errors; the console
    /// stays usable afterwards.
    pub async fn execute(&mut self, command: Command) -> Result<Reply> {
        let text = match command {
            Command::As(who) => {
                self.caller = who;
                format!("now acting as {}", self.caller)
            }
            Command::WhoAmI => self.caller.to_string(),
            Command::Purchase { id, limit, payment } => {
                self.service
                    .purchase_policy(&self.caller, id, limit, payment)
                    .await?;
                format!("policy {id} purchased by {}", self.caller)
            }
            Command::Grant { id, field, grantee } => {
                self.service
                    .grant(&self.caller, id, grantee.clone(), field)
                    .await?;
                format!("{grantee} may read {field} of policy {id}")
            }
            Command::Read { id, field } => {
                let value = self.service.read(&self.caller, id, field).await?;
                format!("{field} of policy {id}: {value}")
            }
            Command::Count => format!("{} policies", self.service.policy_count().await),
            Command::Help => HELP.to_string(),
            Command::Quit => return Ok(Reply::Quit),
        };
        Ok(Reply::Text(text))
    }
}
