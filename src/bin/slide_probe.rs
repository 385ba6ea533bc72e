//! slide_probe - push a player around a small test map and print where
//! the movement code puts it each tic.
//!
//! ```bash
//! RUST_LOG=yadoom_playsim=debug cargo run --bin slide_probe -- \
//!     --momx 12 --momy 7 --tics 40 --specials 10 --generator-magic
//! ```

use clap::Parser;
use env_logger::{Builder, Env};
use glam::Vec2;
use hecs::{Entity, World};

use yadoom_playsim::{
    defs::{StateRequest, info},
    math::{ANG45, Fixed, to_f32, to_fixed},
    sim::{Hooks, Mobj, PhysicsConfig, Player, Sim, SpawnZ, SpechitMagic, TicRunner},
    world::{LevelBuilder, LineId, Level},
};

/// CLI options handled via `clap` derive.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// Starting x momentum, map units per tic
    #[arg(long, default_value_t = 12.0, allow_hyphen_values = true)]
    momx: f32,

    /// Starting y momentum, map units per tic
    #[arg(long, default_value_t = 7.0, allow_hyphen_values = true)]
    momy: f32,

    /// Number of tics to run
    #[arg(long, default_value_t = 35)]
    tics: u32,

    /// Special lines laid across the start of the path
    #[arg(long, default_value_t = 0)]
    specials: i32,

    /// Overrun base address, hex
    #[arg(long, value_name = "HEX", value_parser = parse_hex, conflicts_with = "generator_magic")]
    spechit: Option<u32>,

    /// Use the generator-derived overrun base instead of the default
    #[arg(long)]
    generator_magic: bool,

    /// Keep the forward key held, so friction never stops the player
    #[arg(long)]
    hold: bool,

    /// Editor number of a monster to stand in the player's path
    #[arg(long, value_name = "DOOMEDNUM")]
    blocker: Option<i32>,
}

fn parse_hex(s: &str) -> Result<u32, String> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    u32::from_str_radix(digits, 16).map_err(|e| format!("bad hex value {s:?}: {e}"))
}

/// Hooks that only log what the core asks for.
#[derive(Default)]
struct ProbeHooks {
    rng: u8,
    crossed: Vec<LineId>,
}

impl Hooks for ProbeHooks {
    fn random(&mut self) -> u8 {
        self.rng = self.rng.wrapping_mul(5).wrapping_add(17);
        self.rng
    }

    fn check_sight(&mut self, _sim: &Sim, _looker: Entity, _target: Entity) -> bool {
        true
    }

    fn cross_special_line(&mut self, _world: &mut World, line: LineId, side: usize, thing: Entity) {
        log::info!("{thing:?} crossed line {line} from side {side}");
        self.crossed.push(line);
    }

    fn set_state(&mut self, _world: &mut World, thing: Entity, state: StateRequest) {
        log::debug!("{thing:?} -> {state:?}");
    }
}

/// 512×256 room with the north-east corner cut off at 45 degrees, plus
/// `specials` two-sided special lines near the start.
fn probe_map(specials: i32) -> anyhow::Result<Level> {
    let u = to_fixed;
    let mut b = LevelBuilder::new("PROBE");
    let s = b.add_sector(0, u(128));
    b.add_subsector(s);

    let outline = [(0, 0), (0, 256), (384, 256), (512, 128), (512, 0)];
    for (i, &(x1, y1)) in outline.iter().enumerate() {
        let (x2, y2) = outline[(i + 1) % outline.len()];
        b.add_line(u(x1), u(y1), u(x2), u(y2), s);
    }

    for i in 0..specials {
        let x = u(96 + i);
        let l = b.add_two_sided(x, u(32), x, u(224), s, s);
        b.set_special(l, 1, 0);
    }

    Ok(b.build()?)
}

fn to_vec2(x: Fixed, y: Fixed) -> Vec2 {
    Vec2::new(to_f32(x), to_f32(y))
}

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let magic = match (opts.spechit, opts.generator_magic) {
        (Some(v), _) => SpechitMagic::Custom(v),
        (None, true) => SpechitMagic::Generator,
        (None, false) => SpechitMagic::default(),
    };
    let config = PhysicsConfig { spechit_magic: magic, ..PhysicsConfig::default() };
    log::info!("overrun base {:#010x}", magic.base());

    let mut sim = Sim::new(probe_map(opts.specials)?, config);
    let player = sim.spawn_player(to_fixed(64), to_fixed(128), ANG45)?;
    {
        let world = sim.world_mut();
        let mut mo = world.get::<&mut Mobj>(player)?;
        mo.momx = (opts.momx * 65536.0) as Fixed;
        mo.momy = (opts.momy * 65536.0) as Fixed;
    }
    if let Some(num) = opts.blocker {
        let kind = info::by_doomednum(num)
            .ok_or_else(|| anyhow::anyhow!("no built-in actor with editor number {num}"))?;
        let e = sim.spawn_mobj(kind, to_fixed(224), to_fixed(208), SpawnZ::OnFloor)?;
        log::info!("{:?} {e:?} blocks the path", kind.kind);
    }
    if opts.hold {
        sim.world_mut().get::<&mut Player>(player)?.cmd.forward = 25;
    }

    let mut runner = TicRunner::new(sim);
    let mut hooks = ProbeHooks::default();

    for _ in 0..opts.tics {
        runner.tick(&mut hooks)?;
        let mo = runner.sim().mobj(player)?;
        let pos = to_vec2(mo.x, mo.y);
        let mom = to_vec2(mo.momx, mo.momy);
        println!(
            "tic {:3}  pos ({:8.3}, {:8.3})  mom ({:7.3}, {:7.3})  |mom| {:6.3}",
            runner.sim().leveltime(),
            pos.x,
            pos.y,
            mom.x,
            mom.y,
            mom.length()
        );
        if mom == Vec2::ZERO {
            break;
        }
    }

    let crush = runner.sim().crush_state();
    println!(
        "crossed {} special lines; crush state {:#x}/{:#x}",
        hooks.crossed.len(),
        crush.crush_change,
        crush.nofit
    );
    Ok(())
}
