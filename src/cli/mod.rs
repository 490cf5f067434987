use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use services::{GameService, ServiceError, ServiceResult};
use std::io::{IsTerminal, Read};
use std::path::PathBuf;

/// Thin command-line front over the service layer. Every command prints a
/// JSON document; mutating commands take their payload from `--data` or
/// stdin.
#[derive(Debug, Parser)]
#[command(name = "football_manager", version, about = "Turn-based football manager engine")]
pub struct Cli {
    /// Directory holding career save files.
    #[arg(long, default_value = "saves")]
    pub saves_dir: PathBuf,

    /// Explicit save file to operate on.
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Inline JSON payload for mutating commands.
    #[arg(long)]
    pub data: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Saved careers.
    Career {
        #[command(subcommand)]
        command: CareerCmd,
    },
    /// Create, dump, save or load a game.
    Game {
        #[command(subcommand)]
        command: GameCmd,
    },
    /// Game options.
    Options {
        #[command(subcommand)]
        command: OptionsCmd,
    },
    /// League table.
    Table {
        #[command(subcommand)]
        command: GetCmd,
    },
    /// Scheduled fixtures.
    Fixtures {
        #[command(subcommand)]
        command: ListCmd,
    },
    /// Single matches.
    Match {
        #[command(subcommand)]
        command: MatchCmd,
    },
    /// Team summary.
    Team {
        #[command(subcommand)]
        command: TeamCmd,
    },
    /// Squad listing.
    Squad {
        #[command(subcommand)]
        command: TeamCmd,
    },
    /// Player lookup.
    Player {
        #[command(subcommand)]
        command: PlayerCmd,
    },
    /// Statistics payload.
    Stats {
        #[command(subcommand)]
        command: GetCmd,
    },
    /// Youth offers and preferences.
    Youth {
        #[command(subcommand)]
        command: YouthCmd,
    },
    /// Transfer market.
    Transfers {
        #[command(subcommand)]
        command: TransfersCmd,
    },
    /// Club economy.
    Economy {
        #[command(subcommand)]
        command: EconomyCmd,
    },
    /// Mailbox.
    Mail {
        #[command(subcommand)]
        command: MailCmd,
    },
    /// Knockout cup.
    Cup {
        #[command(subcommand)]
        command: CupCmd,
    },
    /// Season lifecycle.
    Season {
        #[command(subcommand)]
        command: SeasonCmd,
    },
    /// Calendar advancement.
    Calendar {
        #[command(subcommand)]
        command: CalendarCmd,
    },
    /// Club tactics.
    Tactics {
        #[command(subcommand)]
        command: TacticsCmd,
    },
    /// Form training.
    Training {
        #[command(subcommand)]
        command: TrainingCmd,
    },
}

#[derive(Debug, Subcommand)]
pub enum CareerCmd {
    /// List saved careers.
    List,
}

#[derive(Debug, Subcommand)]
pub enum GameCmd {
    /// Create a new career from the JSON payload.
    New,
    /// Dump the full contract.
    Dump,
    /// Save the active career under a new name.
    Save { name: String },
    /// Load a career by id.
    Load { career_id: String },
}

#[derive(Debug, Subcommand)]
pub enum OptionsCmd {
    /// Merge the JSON payload into the options map.
    Set,
}

#[derive(Debug, Subcommand)]
pub enum GetCmd {
    Get,
}

#[derive(Debug, Subcommand)]
pub enum ListCmd {
    List,
}

#[derive(Debug, Subcommand)]
pub enum MatchCmd {
    /// Match details, scheduled or final.
    Get { match_id: String },
    /// Overwrite a logged result from the JSON payload.
    SetResult { match_id: String },
    /// Simulate a scheduled fixture.
    Simulate {
        match_id: String,
        #[arg(long, default_value = "quick")]
        mode: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum TeamCmd {
    Get { team_id: String },
}

#[derive(Debug, Subcommand)]
pub enum PlayerCmd {
    Get { player_id: String },
}

#[derive(Debug, Subcommand)]
pub enum YouthCmd {
    /// Current offers per club.
    Get,
    /// Preferred position for the youth intake.
    SetPreference { preference: String },
    /// Accept one offer by club and index.
    Accept { club: String, index: usize },
}

#[derive(Debug, Subcommand)]
pub enum TransfersCmd {
    /// Current market listings.
    Market,
    /// Buy a listing by index.
    Buy { club: String, index: usize },
    /// Submit a transfer bid from the JSON payload.
    Bid,
}

#[derive(Debug, Subcommand)]
pub enum EconomyCmd {
    Get,
    /// One-off sponsor activity income.
    Sponsor {
        club: String,
        #[arg(long, default_value_t = 1_000_000)]
        amount: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum MailCmd {
    List,
    /// Mark a message as read.
    Read { mail_id: String },
}

#[derive(Debug, Subcommand)]
pub enum CupCmd {
    Get,
    /// Start the cup over all league clubs.
    Start,
    /// Play the next cup round.
    Advance,
}

#[derive(Debug, Subcommand)]
pub enum SeasonCmd {
    Start,
    End,
}

#[derive(Debug, Subcommand)]
pub enum CalendarCmd {
    NextWeek,
}

#[derive(Debug, Subcommand)]
pub enum TacticsCmd {
    /// Apply tactics from the JSON payload to a team.
    Set { team_id: String },
}

#[derive(Debug, Subcommand)]
pub enum TrainingCmd {
    /// Start form training for a player.
    Start { club: String, player_id: u32 },
    List,
}

impl Cli {
    /// Payload for mutating commands: `--data` wins, otherwise piped stdin,
    /// otherwise an empty object.
    pub fn payload(&self) -> ServiceResult<Value> {
        if let Some(data) = &self.data {
            return serde_json::from_str(data)
                .map_err(|err| ServiceError::invalid_input(format!("Ogiltig JSON i --data: {err}")));
        }
        let mut stdin = std::io::stdin();
        if stdin.is_terminal() {
            return Ok(json!({}));
        }
        let mut raw = String::new();
        stdin
            .read_to_string(&mut raw)
            .map_err(|err| ServiceError::invalid_input(format!("Kunde inte läsa stdin: {err}")))?;
        if raw.trim().is_empty() {
            return Ok(json!({}));
        }
        serde_json::from_str(&raw)
            .map_err(|err| ServiceError::invalid_input(format!("Ogiltig JSON på stdin: {err}")))
    }
}

fn contract_section(service: &mut GameService, key: &str) -> ServiceResult<Value> {
    let contract = service.dump(None)?;
    Ok(contract[key].clone())
}

pub fn dispatch(cli: &Cli, service: &mut GameService) -> ServiceResult<Value> {
    match &cli.command {
        Command::Career { command: CareerCmd::List } => {
            Ok(json!({ "careers": service.careers().list_careers() }))
        }

        Command::Game { command } => match command {
            GameCmd::New => service.create(&cli.payload()?),
            GameCmd::Dump => service.dump(None),
            GameCmd::Save { name } => service.save_as(name),
            GameCmd::Load { career_id } => service.load_career(career_id),
        },

        Command::Options { command: OptionsCmd::Set } => service.update_options(&cli.payload()?),

        Command::Table { command: GetCmd::Get } => contract_section(service, "standings"),
        Command::Fixtures { command: ListCmd::List } => contract_section(service, "fixtures"),
        Command::Stats { command: GetCmd::Get } => contract_section(service, "stats"),

        Command::Match { command } => match command {
            MatchCmd::Get { match_id } => service.get_match_details(match_id),
            MatchCmd::SetResult { match_id } => {
                service.set_match_result(match_id, &cli.payload()?)
            }
            MatchCmd::Simulate { match_id, mode } => service.simulate_fixture(match_id, mode),
        },

        Command::Team { command: TeamCmd::Get { team_id } } => {
            let teams = contract_section(service, "teams")?;
            teams
                .as_array()
                .and_then(|teams| {
                    teams
                        .iter()
                        .find(|team| team["id"].as_str() == Some(team_id))
                        .cloned()
                })
                .ok_or_else(|| ServiceError::not_found(format!("Lag '{team_id}' hittades inte.")))
        }

        Command::Squad { command: TeamCmd::Get { team_id } } => {
            let squads = contract_section(service, "squads")?;
            squads
                .get(team_id)
                .cloned()
                .ok_or_else(|| ServiceError::not_found(format!("Lag '{team_id}' hittades inte.")))
        }

        Command::Player { command: PlayerCmd::Get { player_id } } => {
            let players = contract_section(service, "players")?;
            let wanted = if player_id.starts_with("p-") {
                player_id.clone()
            } else {
                format!("p-{player_id}")
            };
            players
                .as_array()
                .and_then(|players| {
                    players
                        .iter()
                        .find(|player| player["id"].as_str() == Some(wanted.as_str()))
                        .cloned()
                })
                .ok_or_else(|| {
                    ServiceError::not_found(format!("Spelare '{player_id}' hittades inte."))
                })
        }

        Command::Youth { command } => match command {
            YouthCmd::Get => contract_section(service, "youth"),
            YouthCmd::SetPreference { preference } => service.set_youth_preference(preference),
            YouthCmd::Accept { club, index } => service.accept_junior(club, *index),
        },

        Command::Transfers { command } => match command {
            TransfersCmd::Market => {
                let transfers = contract_section(service, "transfers")?;
                Ok(transfers["market"].clone())
            }
            TransfersCmd::Buy { club, index } => service.buy_from_market(club, *index),
            TransfersCmd::Bid => service.submit_bid(&cli.payload()?),
        },

        Command::Economy { command } => match command {
            EconomyCmd::Get => contract_section(service, "economy"),
            EconomyCmd::Sponsor { club, amount } => service.sponsor_activity(club, *amount),
        },

        Command::Mail { command } => match command {
            MailCmd::List => contract_section(service, "mail"),
            MailCmd::Read { mail_id } => service.mark_mail_read(mail_id),
        },

        Command::Cup { command } => match command {
            CupCmd::Get => service.cup_overview(),
            CupCmd::Start => service.start_cup(&cli.payload()?),
            CupCmd::Advance => service.advance_cup(),
        },

        Command::Season { command } => match command {
            SeasonCmd::Start => service.start_season(),
            SeasonCmd::End => service.end_season(),
        },

        Command::Calendar { command: CalendarCmd::NextWeek } => service.next_week(),

        Command::Tactics { command: TacticsCmd::Set { team_id } } => {
            service.set_tactics(team_id, &cli.payload()?)
        }

        Command::Training { command } => match command {
            TrainingCmd::Start { club, player_id } => service.start_training(club, *player_id),
            TrainingCmd::List => service.list_training(),
        },
    }
}
