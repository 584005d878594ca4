use std::str::FromStr;

use eyre::{ContextCompat, WrapErr};
use itertools::Itertools;

use crate::hud::Palette;
use crate::player::{InputState, Intent, Player};
use crate::world::block::BlockKind;
use crate::world::generator::WorldGenerator;
use crate::world::position::{Direction, Position};
use crate::world::WorldStore;

// longest stretch a single `tick` may simulate
pub const MAX_TICK: f32 = 60.0;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PointerEvent {
    // mine the clicked block
    Primary(Position),
    // place the selected kind against the clicked face
    Secondary(Position, Direction),
}

impl PointerEvent {
    /// Builds a placement from a raw renderer hit: the centre of the clicked
    /// cell and the normal of the face under the pointer.
    pub fn from_hit(x: f32, y: f32, z: f32, normal: (f32, f32, f32)) -> eyre::Result<Self> {
        Ok(PointerEvent::Secondary(
            Position::from_f32(x, y, z)?,
            Direction::from_normal(normal.0, normal.1, normal.2)?,
        ))
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Selection {
    Key(usize),
    Kind(BlockKind),
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Command {
    Pointer(PointerEvent),
    Select(Selection),
    Press(Intent),
    Release(Intent),
    Look(f32),
    Tick(f32),
    Reset,
}

impl FromStr for Command {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let words = s.split_whitespace().collect_vec();
        let (&verb, args) = words.split_first().wrap_err("empty command")?;

        let command = match (verb, args) {
            ("mine", [x, y, z]) => Command::Pointer(PointerEvent::Primary(parse_position(x, y, z)?)),
            ("place", [x, y, z, face]) => Command::Pointer(PointerEvent::Secondary(
                parse_position(x, y, z)?,
                Direction::from_str(face).wrap_err_with(|| format!("unknown face {face:?}"))?,
            )),
            ("select", [entry]) => Command::Select(match entry.parse::<usize>() {
                Ok(key) => Selection::Key(key),
                Err(_) => Selection::Kind(
                    BlockKind::from_str(entry)
                        .wrap_err_with(|| format!("unknown block kind {entry:?}"))?,
                ),
            }),
            ("key", [intent]) => Command::Press(parse_intent(intent)?),
            ("release", [intent]) => Command::Release(parse_intent(intent)?),
            ("look", [yaw]) => Command::Look(parse_finite(yaw)?),
            ("tick", [seconds]) => {
                let seconds = parse_finite(seconds)?;
                eyre::ensure!(
                    (0.0..=MAX_TICK).contains(&seconds),
                    "tick length must lie in 0..={MAX_TICK} seconds"
                );
                Command::Tick(seconds)
            }
            ("reset", []) => Command::Reset,
            _ => eyre::bail!("unrecognized command {s:?}"),
        };

        Ok(command)
    }
}

fn parse_position(x: &str, y: &str, z: &str) -> eyre::Result<Position> {
    Position::from_key(&format!("{x},{y},{z}"))
}

fn parse_intent(intent: &str) -> eyre::Result<Intent> {
    Intent::from_str(intent).wrap_err_with(|| format!("unknown intent {intent:?}"))
}

fn parse_finite(value: &str) -> eyre::Result<f32> {
    let parsed: f32 = value
        .parse()
        .wrap_err_with(|| format!("{value:?} is not a number"))?;
    eyre::ensure!(parsed.is_finite(), "{value:?} is not finite");
    Ok(parsed)
}

/// Parses one command per line; blank lines and `#` comments are skipped.
pub fn parse_script(text: &str) -> eyre::Result<Vec<Command>> {
    text.lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.split('#').next().unwrap_or("").trim()))
        .filter(|(_, line)| !line.is_empty())
        .map(|(line_no, line)| {
            line.parse::<Command>()
                .wrap_err_with(|| format!("line {line_no}"))
        })
        .collect()
}

/// Everything one play session owns: the world store, the camera rig, held
/// keys and the palette.
#[derive(Debug, Clone)]
pub struct Session {
    store: WorldStore,
    player: Player,
    input: InputState,
    palette: Palette,
}

impl Session {
    pub fn new(generator: WorldGenerator) -> Self {
        let store = WorldStore::new(generator);
        let player = Player::spawn(&store);

        Self {
            store,
            player,
            input: InputState::default(),
            palette: Palette::default(),
        }
    }

    pub fn store(&self) -> &WorldStore {
        &self.store
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn pointer(&mut self, event: PointerEvent) -> eyre::Result<()> {
        match event {
            PointerEvent::Primary(pos) => {
                if self.store.world().get(pos).is_some_and(|kind| !kind.is_interactive()) {
                    tracing::debug!("mine at {pos} ignored: not interactive");
                    return Ok(());
                }

                self.store.remove_block(pos);
            }
            PointerEvent::Secondary(pos, face) => {
                match self.store.world().get(pos) {
                    None => {
                        tracing::debug!("place on {pos} ignored: cell is air");
                        return Ok(());
                    }
                    Some(kind) if !kind.is_interactive() => {
                        tracing::debug!("place on {pos} ignored: not interactive");
                        return Ok(());
                    }
                    Some(_) => {}
                }

                let target = pos
                    .walk(face)
                    .wrap_err_with(|| format!("invalid coordinate: {face} of {pos} is outside the world"))?;
                let kind = self.palette.selected();
                eyre::ensure!(kind.is_placeable(), "{kind} cannot be placed");

                self.store.add_block(target, kind);
            }
        }

        Ok(())
    }

    pub fn apply(&mut self, command: Command) -> eyre::Result<()> {
        match command {
            Command::Pointer(event) => self.pointer(event)?,
            Command::Select(Selection::Key(key)) => {
                if self.palette.select_key(key).is_none() {
                    tracing::warn!("no palette entry for key {key}");
                }
            }
            Command::Select(Selection::Kind(kind)) => self.palette.select(kind)?,
            Command::Press(intent) => self.input.press(intent),
            Command::Release(intent) => self.input.release(intent),
            Command::Look(yaw) => self.player.look(yaw),
            Command::Tick(seconds) => self.advance(seconds),
            Command::Reset => {
                self.store.reset();
                self.player = Player::spawn(&self.store);
            }
        }

        Ok(())
    }

    // runs frames of at most 1/60 s
    pub fn advance(&mut self, seconds: f32) {
        const FRAME: f32 = 1.0 / 60.0;

        if !seconds.is_finite() {
            return;
        }

        let mut left = seconds.min(MAX_TICK);
        while left > 0.0 {
            let delta = left.min(FRAME);
            self.player.tick(&self.input, &self.store, delta);
            left -= delta;
        }
    }

    // applies every command, returns how many were rejected
    pub fn run(&mut self, commands: &[Command]) -> usize {
        let mut rejected = 0;

        for (idx, command) in commands.iter().enumerate() {
            if let Err(err) = self.apply(*command) {
                tracing::warn!("command {} ({command:?}) rejected: {err:#}", idx + 1);
                rejected += 1;
            }
        }

        rejected
    }

    pub fn summary(&self) -> String {
        let world = self.store.world();
        let pos = self.player.position;

        format!(
            "blocks: {}\ncolumns: {}\nplayer: ({:.2}, {:.2}, {:.2}) grounded={}\nground top: {}\npalette: {}",
            world.len(),
            world.heights().len(),
            pos.x,
            pos.y,
            pos.z,
            self.player.grounded,
            self.store.get_top_height(pos.x, pos.z),
            self.palette.hint(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_script, Command, PointerEvent, Selection, Session};
    use crate::player::Intent;
    use crate::world::block::BlockKind;
    use crate::world::generator::{GeneratorConfig, WorldGenerator};
    use crate::world::position::{Direction, Position};
    use crate::world::Verify;

    fn single_column_session() -> Session {
        Session::new(WorldGenerator::new(GeneratorConfig::single_column()).expect("valid config"))
    }

    #[test]
    fn unittest_command_parse() -> eyre::Result<()> {
        assert_eq!(
            "mine 1 -2 3".parse::<Command>()?,
            Command::Pointer(PointerEvent::Primary(Position(1, -2, 3)))
        );
        assert_eq!(
            "place 0 0 0 top".parse::<Command>()?,
            Command::Pointer(PointerEvent::Secondary(Position(0, 0, 0), Direction::Top))
        );
        assert_eq!("select 4".parse::<Command>()?, Command::Select(Selection::Key(4)));
        assert_eq!(
            "select wood".parse::<Command>()?,
            Command::Select(Selection::Kind(BlockKind::Wood))
        );
        assert_eq!("key jump".parse::<Command>()?, Command::Press(Intent::Jump));
        assert_eq!("tick 0.5".parse::<Command>()?, Command::Tick(0.5));
        assert_eq!("reset".parse::<Command>()?, Command::Reset);

        for bad in [
            "",
            "mine 1 2",
            "place 0 0 0 up",
            "tick -1",
            "tick 1000",
            "tick NaN",
            "dance",
        ] {
            assert!(bad.parse::<Command>().is_err(), "{bad:?} must be rejected");
        }

        Ok(())
    }

    #[test]
    fn unittest_pointer_from_hit() -> eyre::Result<()> {
        assert_eq!(
            PointerEvent::from_hit(2.0, 0.9, -1.2, (0.0, 0.0, -1.0))?,
            PointerEvent::Secondary(Position(2, 1, -1), Direction::North)
        );
        assert!(PointerEvent::from_hit(f32::NAN, 0.0, 0.0, (0.0, 1.0, 0.0)).is_err());
        assert!(PointerEvent::from_hit(0.0, 0.0, 0.0, (0.5, 0.5, 0.5)).is_err());

        Ok(())
    }

    #[test]
    fn unittest_parse_script_reports_line() {
        let script = "# build\nmine 0 0 0\n\nplace 0 0 0 sideways\n";
        let err = parse_script(script).expect_err("bad face");

        assert!(format!("{err:#}").contains("line 4"));
        assert_eq!(parse_script("mine 0 0 0 # dig\n\n").map(|c| c.len()).ok(), Some(1));
    }

    #[test]
    fn unittest_session_place_and_mine() -> eyre::Result<()> {
        let mut session = single_column_session();
        let script = parse_script("select wood\nplace 0 0 0 top\n")?;
        assert_eq!(session.run(&script), 0);

        let world = session.store().world();
        assert_eq!(world.get(Position(0, 1, 0)), Some(BlockKind::Wood));
        assert_eq!(session.store().get_top_height(0.0, 0.0), 1);

        session.apply("mine 0 1 0".parse()?)?;
        assert_eq!(session.store().get_top_height(0.0, 0.0), 0);

        session.store().world().verify()
    }

    #[test]
    fn unittest_session_ignores_water_clicks() -> eyre::Result<()> {
        let mut session = single_column_session();
        session.apply("place 0 0 0 top".parse()?)?;
        session.store.add_block(Position(0, 2, 0), BlockKind::Water);

        let before = session.store().snapshot();
        session.pointer(PointerEvent::Primary(Position(0, 2, 0)))?;
        session.pointer(PointerEvent::Secondary(Position(0, 2, 0), Direction::Top))?;

        assert_eq!(*session.store().snapshot(), *before);
        assert!(session.apply("select water".parse()?).is_err());

        Ok(())
    }

    #[test]
    fn unittest_session_place_outside_range_is_rejected() {
        let mut session = single_column_session();
        let edge = Position(0, i32::MAX, 0);
        session.store.add_block(edge, BlockKind::Stone);

        assert!(session
            .pointer(PointerEvent::Secondary(edge, Direction::Top))
            .is_err());
    }

    #[test]
    fn unittest_session_place_against_air_is_ignored() -> eyre::Result<()> {
        let mut session = single_column_session();
        let before = session.store().snapshot();

        assert_eq!(session.run(&parse_script("place 5 50 5 top
place 0 1 0 north
")?), 0);
        assert!(std::sync::Arc::ptr_eq(&session.store().snapshot(), &before));

        session.apply("place 0 0 0 top".parse()?)?;
        assert_eq!(session.store().get_top_height(0.0, 0.0), 1);

        Ok(())
    }

    #[test]
    fn unittest_session_walk_and_land() -> eyre::Result<()> {
        let mut session = Session::new(WorldGenerator::new(GeneratorConfig::flat(3))?);
        let script = parse_script("key forward\ntick 0.25\nrelease forward\ntick 2\n")?;
        assert_eq!(session.run(&script), 0);

        let player = session.player();
        assert!(player.grounded);
        assert!(player.position.z < -1.0);
        assert!(session.summary().contains("grounded=true"));

        Ok(())
    }

    #[test]
    fn unittest_session_reset_respawns() -> eyre::Result<()> {
        let mut session = single_column_session();
        assert_eq!(
            session.run(&parse_script("place 0 0 0 top\nplace 0 1 0 top\nreset\n")?),
            0
        );

        assert_eq!(session.store().world().len(), 1);
        assert_eq!(session.store().get_top_height(0.0, 0.0), 0);

        Ok(())
    }
}
