//! Animation library: which clips a character knows about and where to
//! fetch them from.
//!
//! The built-in table maps public clip names (`"idle"`, `"dance ymca"`, ...)
//! to files on the clips CDN. Callers extend or replace entries with
//! [`AnimationLibrary::merged`]; the JSON shape is `{ "name": { "url": "...",
//! "async": true } }`.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::errors::Result;

pub const DEFAULT_MODEL_PATH: &str = "https://d2tm2f4d5v0kas.cloudfront.net/3.0/manny.fbx";
pub const DEFAULT_TEXTURE_URL: &str =
    "https://d2tm2f4d5v0kas.cloudfront.net/3.0/manny_body_texture.jpg";
pub const CLIPS_HOST: &str = "https://d2tm2f4d5v0kas.cloudfront.net/clips";

/// Where one clip lives and when to fetch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationDescriptor {
    pub url: String,
    /// Fetch only once the clip becomes the active selection.
    #[serde(rename = "async", default)]
    pub lazy: bool,
}

impl AnimationDescriptor {
    #[must_use]
    pub fn eager(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            lazy: false,
        }
    }

    #[must_use]
    pub fn lazy(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            lazy: true,
        }
    }

    /// Descriptor for `file_name` on the clips CDN.
    #[must_use]
    pub fn hosted(file_name: &str, lazy: bool) -> Self {
        Self {
            url: format!("{CLIPS_HOST}/{file_name}.fbx"),
            lazy,
        }
    }

    #[inline]
    #[must_use]
    pub fn load_eagerly(&self) -> bool {
        !self.lazy
    }
}

/// Name → descriptor map, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimationLibrary {
    entries: BTreeMap<String, AnimationDescriptor>,
}

impl AnimationLibrary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn insert(&mut self, name: impl Into<String>, descriptor: AnimationDescriptor) {
        self.entries.insert(name.into(), descriptor);
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, descriptor: AnimationDescriptor) -> Self {
        self.insert(name, descriptor);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AnimationDescriptor> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnimationDescriptor)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A copy of `self` with `overrides` applied on top; an override replaces
    /// the whole descriptor of a name it shares with `self`.
    #[must_use]
    pub fn merged(&self, overrides: Option<&AnimationLibrary>) -> Self {
        let mut merged = self.clone();
        if let Some(overrides) = overrides {
            for (name, descriptor) in &overrides.entries {
                merged.entries.insert(name.clone(), descriptor.clone());
            }
        }
        merged
    }
}

impl FromIterator<(String, AnimationDescriptor)> for AnimationLibrary {
    fn from_iter<I: IntoIterator<Item = (String, AnimationDescriptor)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

// (public name, file on the clips host)
const DEFAULT_CLIPS: &[(&str, &str)] = &[
    ("waving", "waving"),
    ("thankful", "thankful"),
    ("bashful", "bashful"),
    ("victory", "victory"),
    ("acknowledge", "acknowledge"),
    ("agony", "agony"),
    ("backflip", "backflip"),
    ("bboy brooklyn step", "bboy brooklyn step"),
    ("bboy flair", "bboy flair"),
    ("bboy freeze", "bboy finish"),
    ("bboy hand freeze", "bboy handstand freeze"),
    ("bboy hand spin", "bboy handstand spin"),
    ("blowing kiss", "blow a kiss"),
    ("boogaloo", "boogaloo"),
    ("bored", "bored"),
    ("burpee", "burpee"),
    ("capoeira", "capoeira"),
    ("check phone", "check phone"),
    ("cheer", "cheer"),
    ("clap", "clap"),
    ("cocky", "cocky"),
    ("convulse", "convulse"),
    ("count", "count"),
    ("cry", "cry"),
    ("cut throat", "cut throat"),
    ("dance bellydance", "bellydance"),
    ("dance gangam style", "k-pop dance"),
    ("dance chicken", "chicken dance"),
    ("dance cabbage patch", "cabbage patch dance"),
    ("dance maraschino", "maraschino"),
    ("dance rumba", "rumba dance"),
    ("dance salsa", "salsa dance"),
    ("dance twerk", "twerk"),
    ("dance twist", "twist dance"),
    ("dance ymca", "ymca dance"),
    ("die", "die"),
    ("drunk", "drunk"),
    ("ecstatic", "ecstatic"),
    ("electrocuted", "electrocuted"),
    ("float", "float"),
    ("fly", "fly"),
    ("hurricane kick", "hurricane kick"),
    ("jump", "jump"),
    ("kneel", "kneel"),
    ("look off", "look off"),
    ("loser", "loser"),
    ("no", "no"),
    ("pain", "pain"),
    ("plank", "plank"),
    ("point", "point"),
    ("pray", "pray"),
    ("push up", "push up"),
    ("raise hand", "raise hand"),
    ("rap", "rap"),
    ("run", "run"),
    ("salute", "salute"),
    ("seizure", "seizure"),
    ("shake fist", "shake fist"),
    ("shrug", "shrug"),
    ("sing", "sing"),
    ("sit up", "situp"),
    ("sleep", "sleep"),
    ("smh", "smh"),
    ("stretch neck", "stretch neck"),
    ("t-pose", "t-pose"),
    ("teeter", "teeter"),
    ("think", "think"),
    ("typing", "typing"),
    ("walk sad", "walk sad"),
    ("walk swag", "walk swag"),
    ("yell", "yell"),
];

/// The built-in library. `idle` is fetched on mount; every other clip is
/// fetched when it first becomes active.
pub fn default_library() -> &'static AnimationLibrary {
    static LIBRARY: OnceLock<AnimationLibrary> = OnceLock::new();
    LIBRARY.get_or_init(|| {
        let mut library = AnimationLibrary::new();
        library.insert("idle", AnimationDescriptor::hosted("idle_stand", false));
        for &(name, file) in DEFAULT_CLIPS {
            library.insert(name, AnimationDescriptor::hosted(file, true));
        }
        library
    })
}

/// Every public name of the built-in library.
pub fn default_animation_names() -> impl Iterator<Item = &'static str> {
    default_library().names()
}
