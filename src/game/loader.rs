//! Level Load and Save
//!
//! Levels are stored as JSON documents holding a flat list of tagged
//! object records, each a string attribute map. Numeric attributes are
//! stored as raw fixed-point integers so a load/save round trip is
//! exact.
//!
//! Old files are upgraded in memory by an ordered chain of migrations.
//! Each migration is a pure per-object attribute rewrite gated on the
//! file's engine version; saving always emits the current version.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path as FsPath;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::core::fixed::{to_fixed, Fixed};
use crate::core::rect::FixedRect;
use crate::core::vec2::FixedVec2;
use crate::game::ball::BallElement;
use crate::game::boxes::{BoxContent, BoxData, BoxKind, InvisibleMode, ItemType, SpinState};
use crate::game::follower::{EnemyData, Facing, PlatformData};
use crate::game::level::{Background, Level, LevelInfo};
use crate::game::path::{Path, PathMode};
use crate::game::player::PlayerData;
use crate::game::sprite::{ArrayKind, SpriteBase, SpriteKind};

/// Version written by `save_level`. Files at lower versions are run
/// through the migration chain on load.
pub const CURRENT_ENGINE_VERSION: i32 = 4;

/// String attribute map of one object record.
pub type Attributes = BTreeMap<String, String>;

/// One tagged object in a level document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// Object tag, selecting how the record is interpreted
    pub tag: String,
    /// Attribute map
    pub attributes: Attributes,
}

impl ObjectRecord {
    /// Record with the given tag and no attributes.
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: Attributes::new(),
        }
    }

    /// Set a string attribute.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    /// Set a fixed-point attribute as its raw integer representation.
    pub fn set_fixed(&mut self, key: &str, value: Fixed) -> &mut Self {
        self.set(key, value.to_string())
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    fn get_fixed(&self, key: &str) -> Option<Fixed> {
        self.get(key)?.parse::<i32>().ok()
    }

    fn get_fixed_or(&self, key: &str, default: Fixed) -> Fixed {
        self.get_fixed(key).unwrap_or(default)
    }

    fn get_i32_or(&self, key: &str, default: i32) -> i32 {
        self.get(key)
            .and_then(|v| v.parse::<i32>().ok())
            .unwrap_or(default)
    }

    fn get_bool(&self, key: &str) -> bool {
        matches!(self.get(key), Some("1") | Some("true"))
    }
}

/// On-disk shape of a level file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LevelDocument {
    /// File-format version; negative values are treated as current
    pub engine_version: i32,
    /// Level metadata
    pub info: LevelInfo,
    /// RNG seed the level replays with
    pub rng_seed: u64,
    /// Playable bounds as raw fixed-point
    pub bounds: [Fixed; 4],
    /// Object records in authoring order
    pub objects: Vec<ObjectRecord>,
}

/// Errors from level load and save.
#[derive(Debug, Error)]
pub enum LevelError {
    /// File could not be read or written
    #[error("level io: {0}")]
    Io(#[from] std::io::Error),
    /// File is not a valid level document
    #[error("level parse: {0}")]
    Parse(#[from] serde_json::Error),
    /// A record is missing a required attribute
    #[error("object '{tag}' is missing attribute '{attribute}'")]
    MissingAttribute {
        /// The record's tag
        tag: String,
        /// The missing key
        attribute: String,
    },
}

// =============================================================================
// MIGRATIONS
// =============================================================================

struct Migration {
    /// Files below this version get the rewrite
    version: i32,
    apply: fn(&mut ObjectRecord),
}

/// The ordered migration chain. Each entry upgrades files authored
/// before its version; entries run in ascending order so a very old
/// file passes through all of them.
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        apply: migrate_split_pos,
    },
    Migration {
        version: 2,
        apply: migrate_box_attributes,
    },
    Migration {
        version: 3,
        apply: migrate_asset_prefix,
    },
    Migration {
        version: 4,
        apply: migrate_direction_words,
    },
];

/// v1: combined `pos="x,y"` becomes `posx` and `posy`.
fn migrate_split_pos(record: &mut ObjectRecord) {
    if let Some(pos) = record.attributes.remove("pos") {
        if let Some((x, y)) = pos.split_once(',') {
            record.attributes.insert("posx".to_string(), x.trim().to_string());
            record.attributes.insert("posy".to_string(), y.trim().to_string());
        } else {
            warn!(value = %pos, "unsplittable pos attribute dropped");
        }
    }
}

/// v2: box `useable` renamed to `useable_count`, numeric `invisible`
/// codes become names.
fn migrate_box_attributes(record: &mut ObjectRecord) {
    if record.tag != "box" {
        return;
    }
    if let Some(value) = record.attributes.remove("useable") {
        record.attributes.insert("useable_count".to_string(), value);
    }
    if let Some(value) = record.attributes.get_mut("invisible") {
        *value = match value.as_str() {
            "1" => "until_activated".to_string(),
            "2" => "ghost".to_string(),
            "3" => "semi_massive".to_string(),
            "0" => "visible".to_string(),
            other => other.to_string(),
        };
    }
}

/// v3: asset paths lose the old `data/gfx/` prefix.
fn migrate_asset_prefix(record: &mut ObjectRecord) {
    for value in record.attributes.values_mut() {
        if let Some(rest) = value.strip_prefix("data/gfx/") {
            *value = format!("gfx/{rest}");
        }
    }
}

/// v4: numeric `dir` codes become a `direction` word.
fn migrate_direction_words(record: &mut ObjectRecord) {
    if let Some(dir) = record.attributes.remove("dir") {
        let word = match dir.as_str() {
            "1" => "left",
            _ => "right",
        };
        record
            .attributes
            .insert("direction".to_string(), word.to_string());
    }
}

/// Upgrade a document in place to the current engine version.
pub fn apply_migrations(doc: &mut LevelDocument) {
    if doc.engine_version < 0 {
        warn!(
            version = doc.engine_version,
            "level has no usable engine version, assuming current"
        );
        doc.engine_version = CURRENT_ENGINE_VERSION;
        return;
    }
    for migration in MIGRATIONS {
        if doc.engine_version < migration.version {
            info!(to = migration.version, "migrating level document");
            for record in &mut doc.objects {
                (migration.apply)(record);
            }
            doc.engine_version = migration.version;
        }
    }
    doc.engine_version = CURRENT_ENGINE_VERSION;
}

// =============================================================================
// LOAD
// =============================================================================

/// Read, migrate and instantiate a level file.
pub fn load_level(path: &FsPath) -> Result<Level, LevelError> {
    let text = fs::read_to_string(path)?;
    let mut doc: LevelDocument = serde_json::from_str(&text)?;
    apply_migrations(&mut doc);
    from_document(&doc)
}

/// Instantiate a level from an already-migrated document.
pub fn from_document(doc: &LevelDocument) -> Result<Level, LevelError> {
    let bounds = FixedRect::from_parts(doc.bounds[0], doc.bounds[1], doc.bounds[2], doc.bounds[3]);
    let mut level = Level::new(bounds, doc.rng_seed);
    level.info = doc.info.clone();
    level.engine_version = doc.engine_version;

    for record in &doc.objects {
        match record.tag.as_str() {
            "player" => load_player(&mut level, record)?,
            "terrain" => load_terrain(&mut level, record)?,
            "enemy" => load_enemy(&mut level, record)?,
            "box" => load_box(&mut level, record)?,
            "platform" => load_platform(&mut level, record)?,
            "item" => load_item(&mut level, record)?,
            "path" => load_path(&mut level, record)?,
            "background" => load_background(&mut level, record),
            other => {
                warn!(tag = other, "skipping unknown object tag");
            }
        }
    }
    Ok(level)
}

fn require(record: &ObjectRecord, key: &str) -> Result<Fixed, LevelError> {
    record
        .get_fixed(key)
        .ok_or_else(|| LevelError::MissingAttribute {
            tag: record.tag.clone(),
            attribute: key.to_string(),
        })
}

fn load_pos(record: &ObjectRecord) -> Result<FixedVec2, LevelError> {
    Ok(FixedVec2::new(
        require(record, "posx")?,
        require(record, "posy")?,
    ))
}

fn load_size(record: &ObjectRecord) -> FixedVec2 {
    FixedVec2::new(
        record.get_fixed_or("width", to_fixed(1.0)),
        record.get_fixed_or("height", to_fixed(1.0)),
    )
}

fn load_player(level: &mut Level, record: &ObjectRecord) -> Result<(), LevelError> {
    let pos = load_pos(record)?;
    let id = level.sprites.alloc_id();
    let mut base = SpriteBase::new(
        id,
        pos,
        FixedVec2::new(to_fixed(0.9), to_fixed(1.8)),
    );
    base.array = ArrayKind::Player;
    base.image = record.get("image").unwrap_or("gfx/player.png").to_string();
    let mut data = PlayerData::new();
    if record.get("element") == Some("ice") {
        data.element = BallElement::Ice;
    }
    let id = level.sprites.add(base, SpriteKind::Player(data));
    level.context.active_player = Some(id);
    Ok(())
}

fn load_terrain(level: &mut Level, record: &ObjectRecord) -> Result<(), LevelError> {
    let pos = load_pos(record)?;
    let id = level.sprites.alloc_id();
    let mut base = SpriteBase::new(id, pos, load_size(record));
    base.array = ArrayKind::from_attr(record.get("array").unwrap_or("massive"));
    base.image = record.get("image").unwrap_or_default().to_string();
    level.sprites.add(base, SpriteKind::Terrain);
    Ok(())
}

fn load_enemy(level: &mut Level, record: &ObjectRecord) -> Result<(), LevelError> {
    let pos = load_pos(record)?;
    let id = level.sprites.alloc_id();
    let mut base = SpriteBase::new(id, pos, load_size(record));
    base.array = ArrayKind::Enemy;
    base.image = record.get("image").unwrap_or_default().to_string();

    let mut data = match record.get("path") {
        Some(path_id) => {
            EnemyData::path_bound(path_id, record.get_fixed_or("speed", to_fixed(2.0)))
        }
        None => EnemyData::walker(
            record.get_fixed_or("speed", to_fixed(1.5)),
            Facing::from_attr(record.get("direction").unwrap_or("left")),
        ),
    };
    data.resistant = record.get_bool("resistant");

    let id = level.sprites.add(base, SpriteKind::Enemy(data));
    link_follower_path(level, id, record.get("path"));
    Ok(())
}

fn load_box(level: &mut Level, record: &ObjectRecord) -> Result<(), LevelError> {
    let pos = load_pos(record)?;
    let kind = match record.get("kind").unwrap_or("bonus") {
        "spin" => BoxKind::Spin(SpinState::Idle),
        "text" => BoxKind::Text {
            text: record.get("text").unwrap_or_default().to_string(),
        },
        _ => BoxKind::Bonus {
            content: match record.get("content").unwrap_or("empty") {
                "empty" => BoxContent::Empty,
                "random" => BoxContent::Random,
                item => match ItemType::from_attr(item) {
                    Some(item) => BoxContent::Item(item),
                    None => {
                        warn!(content = item, "unknown box content, treating as empty");
                        BoxContent::Empty
                    }
                },
            },
        },
    };
    let mut data = BoxData::new(kind);
    data.useable_count = record.get_i32_or("useable_count", 1);
    data.invisible = InvisibleMode::from_attr(record.get("invisible").unwrap_or("visible"));

    let id = level.sprites.alloc_id();
    let mut base = SpriteBase::new(id, pos, load_size(record));
    base.array = data.effective_array();
    base.image = record.get("image").unwrap_or_default().to_string();
    level.sprites.add(base, SpriteKind::Box(data));
    Ok(())
}

fn load_platform(level: &mut Level, record: &ObjectRecord) -> Result<(), LevelError> {
    let pos = load_pos(record)?;
    let path_id = record
        .get("path")
        .ok_or_else(|| LevelError::MissingAttribute {
            tag: record.tag.clone(),
            attribute: "path".to_string(),
        })?;
    let id = level.sprites.alloc_id();
    let mut base = SpriteBase::new(id, pos, load_size(record));
    base.array = ArrayKind::Massive;
    base.image = record.get("image").unwrap_or_default().to_string();
    let data = PlatformData::new(path_id, record.get_fixed_or("speed", to_fixed(2.0)));
    let id = level.sprites.add(base, SpriteKind::Platform(data));
    link_follower_path(level, id, record.get("path"));
    Ok(())
}

fn load_item(level: &mut Level, record: &ObjectRecord) -> Result<(), LevelError> {
    let pos = load_pos(record)?;
    let Some(item) = record.get("item").and_then(ItemType::from_attr) else {
        warn!("item record without a known item type skipped");
        return Ok(());
    };
    let id = level.sprites.alloc_id();
    let mut base = SpriteBase::new(id, pos, load_size(record));
    base.array = ArrayKind::Active;
    base.image = record.get("image").unwrap_or_default().to_string();
    level.sprites.add(base, SpriteKind::Item(item));
    Ok(())
}

fn load_path(level: &mut Level, record: &ObjectRecord) -> Result<(), LevelError> {
    let identifier = record
        .get("identifier")
        .ok_or_else(|| LevelError::MissingAttribute {
            tag: record.tag.clone(),
            attribute: "identifier".to_string(),
        })?;
    let anchor = load_pos(record)?;
    let mode = match record.get("mode") {
        Some("rewind") => PathMode::Rewind,
        _ => PathMode::Mirror,
    };
    let mut path = Path::new(identifier, anchor, mode);
    if let Some(segments) = record.get("segments") {
        for part in segments.split(';').filter(|p| !p.is_empty()) {
            if let Some((start, end)) = parse_segment(part) {
                path.add_segment(start, end);
            } else {
                warn!(segment = part, "malformed path segment skipped");
            }
        }
    }
    level.add_path(path);
    Ok(())
}

fn load_background(level: &mut Level, record: &ObjectRecord) {
    level.backgrounds.push(Background {
        image: record.get("image").unwrap_or_default().to_string(),
        speed: FixedVec2::new(
            record.get_fixed_or("speedx", to_fixed(0.5)),
            record.get_fixed_or("speedy", to_fixed(0.5)),
        ),
        offset: FixedVec2::new(
            record.get_fixed_or("posx", 0),
            record.get_fixed_or("posy", 0),
        ),
    });
}

fn link_follower_path(level: &mut Level, id: crate::game::sprite::SpriteId, path_id: Option<&str>) {
    if let Some(path_id) = path_id {
        if let Some(path) = level.paths.get_mut(path_id) {
            path.link_follower(id);
        }
        // A missing path is legal; the follower holds its start
    }
}

/// Parse `"sx,sy:ex,ey"` into segment endpoints.
fn parse_segment(text: &str) -> Option<(FixedVec2, FixedVec2)> {
    let (start, end) = text.split_once(':')?;
    Some((parse_point(start)?, parse_point(end)?))
}

fn parse_point(text: &str) -> Option<FixedVec2> {
    let (x, y) = text.split_once(',')?;
    Some(FixedVec2::new(
        x.trim().parse::<i32>().ok()?,
        y.trim().parse::<i32>().ok()?,
    ))
}

// =============================================================================
// SAVE
// =============================================================================

/// Serialize a level and write it to `path`. Always emits the current
/// engine version; runtime-spawned and destroy-marked sprites are
/// skipped.
pub fn save_level(level: &Level, path: &FsPath) -> Result<(), LevelError> {
    let doc = to_document(level);
    let text = serde_json::to_string_pretty(&doc)?;
    fs::write(path, text)?;
    Ok(())
}

/// Build the on-disk document from a level.
pub fn to_document(level: &Level) -> LevelDocument {
    let mut objects = Vec::new();

    for path in level.paths.values() {
        let mut record = ObjectRecord::new("path");
        record.set("identifier", path.identifier.clone());
        record.set_fixed("posx", path.anchor.x);
        record.set_fixed("posy", path.anchor.y);
        record.set(
            "mode",
            match path.mode {
                PathMode::Mirror => "mirror",
                PathMode::Rewind => "rewind",
            },
        );
        let segments: Vec<String> = path
            .segments
            .iter()
            .map(|seg| {
                format!(
                    "{},{}:{},{}",
                    seg.start.x, seg.start.y, seg.end.x, seg.end.y
                )
            })
            .collect();
        record.set("segments", segments.join(";"));
        objects.push(record);
    }

    for background in &level.backgrounds {
        let mut record = ObjectRecord::new("background");
        record.set("image", background.image.clone());
        record.set_fixed("speedx", background.speed.x);
        record.set_fixed("speedy", background.speed.y);
        record.set_fixed("posx", background.offset.x);
        record.set_fixed("posy", background.offset.y);
        objects.push(record);
    }

    for (_, sprite) in level.sprites.iter() {
        if sprite.base.spawned || sprite.base.auto_destroy {
            continue;
        }
        if let Some(record) = sprite_record(sprite) {
            objects.push(record);
        }
    }

    LevelDocument {
        engine_version: CURRENT_ENGINE_VERSION,
        info: level.info.clone(),
        rng_seed: level.rng_seed,
        bounds: [
            level.bounds.pos.x,
            level.bounds.pos.y,
            level.bounds.size.x,
            level.bounds.size.y,
        ],
        objects,
    }
}

fn sprite_record(sprite: &crate::game::sprite::Sprite) -> Option<ObjectRecord> {
    let base = &sprite.base;
    let mut record = match &sprite.kind {
        SpriteKind::Player(data) => {
            let mut record = ObjectRecord::new("player");
            record.set("element", data.element.as_attr());
            record
        }
        SpriteKind::Terrain => {
            let mut record = ObjectRecord::new("terrain");
            record.set("array", base.array.as_attr());
            record
        }
        SpriteKind::Enemy(data) => {
            let mut record = ObjectRecord::new("enemy");
            if let Some(follower) = &data.follower {
                record.set("path", follower.path_id.clone());
                record.set_fixed("speed", follower.speed);
            } else {
                record.set_fixed("speed", data.walk_speed);
                record.set("direction", data.facing.as_attr());
            }
            if data.resistant {
                record.set("resistant", "1");
            }
            record
        }
        SpriteKind::Box(data) => {
            let mut record = ObjectRecord::new("box");
            match &data.kind {
                BoxKind::Bonus { content } => {
                    record.set("kind", "bonus");
                    record.set(
                        "content",
                        match content {
                            BoxContent::Empty => "empty",
                            BoxContent::Random => "random",
                            BoxContent::Item(item) => item.as_attr(),
                        },
                    );
                }
                BoxKind::Spin(_) => {
                    record.set("kind", "spin");
                }
                BoxKind::Text { text } => {
                    record.set("kind", "text");
                    record.set("text", text.clone());
                }
            }
            record.set("useable_count", data.useable_count.to_string());
            record.set("invisible", data.invisible.as_attr());
            record
        }
        SpriteKind::Platform(data) => {
            let mut record = ObjectRecord::new("platform");
            record.set("path", data.follower.path_id.clone());
            record.set_fixed("speed", data.follower.speed);
            record
        }
        SpriteKind::Item(item) => {
            let mut record = ObjectRecord::new("item");
            record.set("item", item.as_attr());
            record
        }
        // Balls and particles only exist at runtime
        SpriteKind::Ball(_) | SpriteKind::Particle => return None,
    };

    record.set_fixed("posx", base.start_pos.x);
    record.set_fixed("posy", base.start_pos.y);
    record.set_fixed("width", base.col_size.x);
    record.set_fixed("height", base.col_size.y);
    if !base.image.is_empty() {
        record.set("image", base.image.clone());
    }
    Some(record)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::FIXED_ONE;

    fn empty_doc(version: i32) -> LevelDocument {
        LevelDocument {
            engine_version: version,
            info: LevelInfo::default(),
            rng_seed: 7,
            bounds: [0, 0, to_fixed(100.0), to_fixed(30.0)],
            objects: Vec::new(),
        }
    }

    fn record(tag: &str, attrs: &[(&str, &str)]) -> ObjectRecord {
        let mut record = ObjectRecord::new(tag);
        for (key, value) in attrs {
            record.set(*key, *value);
        }
        record
    }

    #[test]
    fn test_migration_split_pos() {
        let mut rec = record("terrain", &[("pos", "65536, 131072")]);
        migrate_split_pos(&mut rec);
        assert_eq!(rec.attributes.get("posx").map(String::as_str), Some("65536"));
        assert_eq!(rec.attributes.get("posy").map(String::as_str), Some("131072"));
        assert!(!rec.attributes.contains_key("pos"));
    }

    #[test]
    fn test_migration_split_pos_is_idempotent() {
        let mut rec = record("terrain", &[("posx", "65536"), ("posy", "131072")]);
        let before = rec.clone();
        migrate_split_pos(&mut rec);
        assert_eq!(rec, before);
    }

    #[test]
    fn test_migration_box_attributes() {
        let mut rec = record("box", &[("useable", "3"), ("invisible", "1")]);
        migrate_box_attributes(&mut rec);
        assert_eq!(
            rec.attributes.get("useable_count").map(String::as_str),
            Some("3")
        );
        assert!(!rec.attributes.contains_key("useable"));
        assert_eq!(
            rec.attributes.get("invisible").map(String::as_str),
            Some("until_activated")
        );

        let mut rec = record("box", &[("invisible", "3")]);
        migrate_box_attributes(&mut rec);
        assert_eq!(
            rec.attributes.get("invisible").map(String::as_str),
            Some("semi_massive")
        );

        // Non-box records are untouched
        let mut other = record("enemy", &[("useable", "3")]);
        migrate_box_attributes(&mut other);
        assert!(other.attributes.contains_key("useable"));
    }

    #[test]
    fn test_migration_asset_prefix() {
        let mut rec = record("terrain", &[("image", "data/gfx/ground.png")]);
        migrate_asset_prefix(&mut rec);
        assert_eq!(
            rec.attributes.get("image").map(String::as_str),
            Some("gfx/ground.png")
        );
        // Already-migrated paths pass through
        migrate_asset_prefix(&mut rec);
        assert_eq!(
            rec.attributes.get("image").map(String::as_str),
            Some("gfx/ground.png")
        );
    }

    #[test]
    fn test_migration_direction_words() {
        let mut rec = record("enemy", &[("dir", "1")]);
        migrate_direction_words(&mut rec);
        assert_eq!(
            rec.attributes.get("direction").map(String::as_str),
            Some("left")
        );
        assert!(!rec.attributes.contains_key("dir"));

        let mut rec = record("enemy", &[("dir", "0")]);
        migrate_direction_words(&mut rec);
        assert_eq!(
            rec.attributes.get("direction").map(String::as_str),
            Some("right")
        );
    }

    #[test]
    fn test_migration_chain_runs_in_order() {
        let mut doc = empty_doc(0);
        doc.objects.push(record(
            "box",
            &[
                ("pos", "65536,65536"),
                ("useable", "2"),
                ("image", "data/gfx/box.png"),
            ],
        ));
        apply_migrations(&mut doc);
        assert_eq!(doc.engine_version, CURRENT_ENGINE_VERSION);
        let rec = &doc.objects[0];
        assert!(rec.attributes.contains_key("posx"));
        assert!(rec.attributes.contains_key("useable_count"));
        assert_eq!(
            rec.attributes.get("image").map(String::as_str),
            Some("gfx/box.png")
        );
    }

    #[test]
    fn test_migration_skips_newer_files() {
        let mut doc = empty_doc(2);
        doc.objects
            .push(record("box", &[("useable", "2"), ("posx", "0"), ("posy", "0")]));
        apply_migrations(&mut doc);
        // v2 rewrite must not run on a v2 file
        assert!(doc.objects[0].attributes.contains_key("useable"));
        assert_eq!(doc.engine_version, CURRENT_ENGINE_VERSION);
    }

    #[test]
    fn test_negative_version_assumes_current() {
        let mut doc = empty_doc(-1);
        doc.objects.push(record("box", &[("useable", "2")]));
        apply_migrations(&mut doc);
        assert_eq!(doc.engine_version, CURRENT_ENGINE_VERSION);
        assert!(doc.objects[0].attributes.contains_key("useable"));
    }

    #[test]
    fn test_unknown_tag_is_skipped() {
        let mut doc = empty_doc(CURRENT_ENGINE_VERSION);
        doc.objects
            .push(record("flux_capacitor", &[("posx", "0"), ("posy", "0")]));
        let level = from_document(&doc).unwrap();
        assert!(level.sprites.is_empty());
    }

    #[test]
    fn test_missing_attribute_is_an_error() {
        let mut doc = empty_doc(CURRENT_ENGINE_VERSION);
        doc.objects.push(record("terrain", &[("posx", "0")]));
        let err = from_document(&doc).unwrap_err();
        assert!(matches!(
            err,
            LevelError::MissingAttribute { ref attribute, .. } if attribute == "posy"
        ));
    }

    #[test]
    fn test_document_round_trip_is_exact() {
        let mut doc = empty_doc(CURRENT_ENGINE_VERSION);
        doc.objects.push(record(
            "path",
            &[
                ("identifier", "rail"),
                ("posx", "655360"),
                ("posy", "327680"),
                ("mode", "rewind"),
                ("segments", "0,0:1310720,0"),
            ],
        ));
        doc.objects.push(record(
            "terrain",
            &[
                ("posx", "98304"),
                ("posy", "196608"),
                ("width", "131072"),
                ("height", "65536"),
                ("array", "halfmassive"),
                ("image", "gfx/ledge.png"),
            ],
        ));
        doc.objects.push(record(
            "box",
            &[
                ("posx", "0"),
                ("posy", "0"),
                ("width", "65536"),
                ("height", "65536"),
                ("kind", "bonus"),
                ("content", "star"),
                ("useable_count", "-1"),
                ("invisible", "ghost"),
            ],
        ));
        doc.objects.push(record(
            "enemy",
            &[
                ("posx", "131072"),
                ("posy", "131072"),
                ("width", "65536"),
                ("height", "65536"),
                ("speed", "98304"),
                ("direction", "left"),
                ("resistant", "1"),
            ],
        ));

        let level = from_document(&doc).unwrap();
        let saved = to_document(&level);

        // Every authored record survives with its attributes intact
        for original in &doc.objects {
            let found = saved
                .objects
                .iter()
                .find(|r| r.tag == original.tag)
                .unwrap_or_else(|| panic!("missing {} record", original.tag));
            for (key, value) in &original.attributes {
                assert_eq!(
                    found.attributes.get(key),
                    Some(value),
                    "attribute {key} of {} changed",
                    original.tag
                );
            }
        }
        assert_eq!(saved.engine_version, CURRENT_ENGINE_VERSION);
        assert_eq!(saved.rng_seed, 7);
    }

    #[test]
    fn test_spawned_sprites_are_not_saved() {
        let doc = empty_doc(CURRENT_ENGINE_VERSION);
        let mut level = from_document(&doc).unwrap();
        let id = level.sprites.alloc_id();
        let mut base = SpriteBase::new(
            id,
            FixedVec2::ZERO,
            FixedVec2::new(FIXED_ONE, FIXED_ONE),
        );
        base.array = ArrayKind::Active;
        level.sprites.spawn(
            base,
            SpriteKind::Item(ItemType::Star),
        );
        let saved = to_document(&level);
        assert!(saved.objects.is_empty());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("level.json");

        let mut doc = empty_doc(CURRENT_ENGINE_VERSION);
        doc.info.name = "First Ridge".to_string();
        doc.objects.push(record(
            "player",
            &[("posx", "131072"), ("posy", "131072")],
        ));
        let level = from_document(&doc).unwrap();
        save_level(&level, &file).unwrap();

        let loaded = load_level(&file).unwrap();
        assert_eq!(loaded.info.name, "First Ridge");
        assert!(loaded.context.active_player.is_some());
        assert_eq!(loaded.sprites.len(), 1);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("level.json");
        fs::write(&file, "not a level").unwrap();
        assert!(matches!(load_level(&file), Err(LevelError::Parse(_))));
    }

    #[test]
    fn test_old_file_loads_through_migrations() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("old.json");
        let doc = LevelDocument {
            engine_version: 0,
            info: LevelInfo::default(),
            rng_seed: 1,
            bounds: [0, 0, to_fixed(50.0), to_fixed(20.0)],
            objects: vec![record(
                "box",
                &[
                    ("pos", "327680,327680"),
                    ("useable", "2"),
                    ("invisible", "2"),
                    ("image", "data/gfx/box.png"),
                    ("kind", "bonus"),
                    ("content", "moon"),
                ],
            )],
        };
        fs::write(&file, serde_json::to_string(&doc).unwrap()).unwrap();

        let level = load_level(&file).unwrap();
        assert_eq!(level.sprites.len(), 1);
        let (_, sprite) = level.sprites.iter().next().unwrap();
        assert_eq!(sprite.base.pos.x, to_fixed(5.0));
        assert_eq!(sprite.base.image, "gfx/box.png");
        if let SpriteKind::Box(data) = &sprite.kind {
            assert_eq!(data.useable_count, 2);
            assert_eq!(data.invisible, InvisibleMode::Ghost);
        } else {
            panic!("expected a box sprite");
        }
    }
}
