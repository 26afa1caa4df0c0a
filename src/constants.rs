use poise::serenity_prelude::Colour;

/// One row of the rank table. Floors are strictly increasing and the first
/// floor is 0, so every XP value resolves to exactly one rank.
#[derive(Debug, PartialEq, Eq)]
pub struct RankDef {
    pub name: &'static str,
    pub required_xp: u64,
    pub icon: &'static str,
    pub role_name: Option<&'static str>,
}

pub const RANKS: [RankDef; 10] = [
    RankDef {
        name: "Rookie",
        required_xp: 0,
        icon: "🔰",
        role_name: None,
    },
    RankDef {
        name: "Private",
        required_xp: 100,
        icon: "⭐",
        role_name: Some("Private"),
    },
    RankDef {
        name: "Specialist",
        required_xp: 200,
        icon: "⭐",
        role_name: Some("Specialist"),
    },
    RankDef {
        name: "Corporal",
        required_xp: 350,
        icon: "⭐⭐",
        role_name: Some("Corporal"),
    },
    RankDef {
        name: "Sergeant",
        required_xp: 500,
        icon: "⭐⭐⭐",
        role_name: Some("Sergeant"),
    },
    RankDef {
        name: "Lieutenant",
        required_xp: 750,
        icon: "🥉",
        role_name: Some("Lieutenant"),
    },
    RankDef {
        name: "Captain",
        required_xp: 1000,
        icon: "🥈",
        role_name: Some("Captain"),
    },
    RankDef {
        name: "Major",
        required_xp: 1500,
        icon: "🥇",
        role_name: Some("Major"),
    },
    RankDef {
        name: "Colonel",
        required_xp: 2500,
        icon: "💎",
        role_name: Some("Colonel"),
    },
    RankDef {
        name: "FOXHOUND",
        required_xp: 4000,
        icon: "🦊",
        role_name: Some("FOXHOUND"),
    },
];

/// Vocabulary scanned for the per-message keyword bonus. Matching is
/// case-insensitive on word boundaries; multi-word entries match as phrases.
pub const TACTICAL_WORDS: &[&str] = &[
    "tactical",
    "stealth",
    "operation",
    "infiltrate",
    "extract",
    "intel",
    "recon",
    "mission",
    "target",
    "objective",
    "deploy",
    "enemy",
    "patrol",
    "metal gear",
    "foxhound",
    "shadow moses",
    "outer heaven",
    "snake",
    "ocelot",
    "motherbase",
    "phantom pain",
    "peace walker",
    "mg",
    "mgs",
    "nanomachines",
    "revolver",
    "diamond dogs",
    "boss",
    "tactic",
    "espionage",
    "alert",
    "caution",
    "silencer",
    "weapon",
    "gear",
    "military",
    "soldier",
    "warfare",
    "combat",
    "strategy",
    "sniper",
    "assault",
    "defense",
    "artillery",
    "ammunition",
    "camouflage",
    "surveillance",
    "reconnaissance",
    "elimination",
    "extraction",
    "insertion",
    "breach",
    "secure",
    "hostile",
    "friendly",
    "neutral",
    "contact",
    "engage",
    "disengage",
    "retreat",
    "advance",
    "flank",
    "cover",
    "suppression",
    "overwatch",
    "backup",
    "reinforcement",
    "casualty",
    "wounded",
    "medic",
    "evac",
    "rendezvous",
    "cipher",
    "patriot",
    "codec",
    "operative",
    "commander",
    "colonel",
    "major",
    "captain",
    "lieutenant",
    "sergeant",
    "private",
];

/// XP/GMP granted for one unit of an activity.
#[derive(Debug, Clone, Copy)]
pub struct Reward {
    pub xp: u64,
    pub gmp: i64,
}

pub const MESSAGE_REWARD: Reward = Reward { xp: 3, gmp: 15 };
pub const TACTICAL_WORD_REWARD: Reward = Reward { xp: 8, gmp: 25 };
pub const VOICE_MINUTE_REWARD: Reward = Reward { xp: 2, gmp: 8 };
pub const REACTION_REWARD: Reward = Reward { xp: 1, gmp: 3 };
pub const REACTION_RECEIVED_REWARD: Reward = Reward { xp: 2, gmp: 8 };
pub const DAILY_BONUS_REWARD: Reward = Reward { xp: 50, gmp: 200 };

pub const STARTING_GMP: i64 = 1000;

pub const DEFAULT_COOLDOWN_SECS: u64 = 30;
pub const DEFAULT_TACTICAL_BONUS_CAP: u32 = 10;
pub const DEFAULT_FLUSH_INTERVAL_MINUTES: u64 = 5;
pub const DEFAULT_SYNC_INTERVAL_MINUTES: u64 = 60;

pub const LEADERBOARD_LIMIT: usize = 10;
pub const INTEL_HEADLINE_COUNT: usize = 3;

pub const PERSISTED_SCHEMA_VERSION: u32 = 1;

pub const SUCCESS_COLOR: Colour = Colour::new(0x00ff00);
pub const FAILURE_COLOR: Colour = Colour::new(0xff0000);
pub const INFO_COLOR: Colour = Colour::new(0x599cff);
