use clap::{Args, Parser, Subcommand, ValueEnum};
use iy_runtime::PlayerAction;

#[derive(Debug, Parser)]
#[command(name = "idle-player")]
#[command(about = "Idle game agent CLI")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    Agent(AgentArgs),
}

#[derive(Debug, Args)]
pub(crate) struct AgentArgs {
    #[command(subcommand)]
    pub(crate) command: AgentCommand,
}

#[derive(Debug, Subcommand)]
pub(crate) enum AgentCommand {
    Start(StartArgs),
    Tick(TickArgs),
    Choose(ChooseArgs),
    Act(ActArgs),
    Press(PressArgs),
}

#[derive(Debug, Args)]
pub(crate) struct StartArgs {
    /// Directory holding `scripts/` folders; the built-in script is used when omitted.
    #[arg(long = "mods-dir")]
    pub(crate) mods_dir: Option<String>,
    #[arg(long = "config")]
    pub(crate) config: Option<String>,
    #[arg(long = "ticks", default_value_t = 0)]
    pub(crate) ticks: u32,
    #[arg(long = "state-out")]
    pub(crate) state_out: String,
}

#[derive(Debug, Args)]
pub(crate) struct TickArgs {
    #[arg(long = "state-in")]
    pub(crate) state_in: String,
    #[arg(long = "ticks", default_value_t = 1)]
    pub(crate) ticks: u32,
    #[arg(long = "state-out")]
    pub(crate) state_out: String,
}

#[derive(Debug, Args)]
pub(crate) struct ChooseArgs {
    #[arg(long = "state-in")]
    pub(crate) state_in: String,
    #[arg(long = "choice")]
    pub(crate) choice: String,
    #[arg(long = "state-out")]
    pub(crate) state_out: String,
}

#[derive(Debug, Args)]
pub(crate) struct ActArgs {
    #[arg(long = "state-in")]
    pub(crate) state_in: String,
    #[arg(long = "action", value_enum)]
    pub(crate) action: ActionArg,
    #[arg(long = "state-out")]
    pub(crate) state_out: String,
}

#[derive(Debug, Args)]
pub(crate) struct PressArgs {
    #[arg(long = "state-in")]
    pub(crate) state_in: String,
    #[arg(long = "button")]
    pub(crate) button: String,
    #[arg(long = "state-out")]
    pub(crate) state_out: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ActionArg {
    WatchTv,
    BuyFood,
    BuyFoodMax,
}

impl From<ActionArg> for PlayerAction {
    fn from(action: ActionArg) -> Self {
        match action {
            ActionArg::WatchTv => PlayerAction::WatchTv,
            ActionArg::BuyFood => PlayerAction::BuyFood,
            ActionArg::BuyFoodMax => PlayerAction::BuyFoodMax,
        }
    }
}

#[cfg(test)]
mod cli_args_tests {
    use super::*;

    #[test]
    fn agent_start_defaults_ticks_to_zero() {
        let cli = Cli::try_parse_from(["idle-player", "agent", "start", "--state-out", "s.json"])
            .expect("start should parse");
        let Mode::Agent(AgentArgs {
            command: AgentCommand::Start(args),
        }) = cli.command
        else {
            panic!("expected start command");
        };
        assert_eq!(args.ticks, 0);
        assert!(args.mods_dir.is_none());
        assert!(args.config.is_none());
    }

    #[test]
    fn agent_act_parses_kebab_case_actions() {
        let cli = Cli::try_parse_from([
            "idle-player",
            "agent",
            "act",
            "--state-in",
            "a.json",
            "--action",
            "buy-food-max",
            "--state-out",
            "b.json",
        ])
        .expect("act should parse");
        let Mode::Agent(AgentArgs {
            command: AgentCommand::Act(args),
        }) = cli.command
        else {
            panic!("expected act command");
        };
        assert_eq!(PlayerAction::from(args.action), PlayerAction::BuyFoodMax);

        let error = Cli::try_parse_from([
            "idle-player",
            "agent",
            "act",
            "--state-in",
            "a.json",
            "--action",
            "dance",
            "--state-out",
            "b.json",
        ])
        .expect_err("unknown action should fail");
        assert_eq!(error.kind(), clap::error::ErrorKind::InvalidValue);
    }
}
