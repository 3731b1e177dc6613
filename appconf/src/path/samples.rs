//! Bundled sample files as fallback defaults.
//!
//! For an option with a shipped sample file, the candidate list is the
//! option's default(s) followed by `<sample_config_dir>/<last default>.sample`.
//! After resolution the candidates are narrowed back down. None of this
//! applies to options the caller set explicitly.

use std::path::Path;

use crate::config::attributes::Attributes;
use crate::config::profile::AppProfile;
use crate::path::probe::PathProbe;
use crate::value::{Options, Value};

/// Appends sample files to defaults and selects among the candidates.
pub struct SampleSelector<'a> {
    profile: &'a AppProfile,
    explicit: &'a Options,
}

impl<'a> SampleSelector<'a> {
    /// Create a selector for the given policy and explicit options.
    #[must_use]
    pub fn new(profile: &'a AppProfile, explicit: &'a Options) -> Self {
        Self { profile, explicit }
    }

    /// Turn each unset sample-file option into its candidate list.
    pub fn expand_defaults(&self, sample_config_dir: &Path, attributes: &mut Attributes) {
        for key in &self.profile.add_sample_file_to_defaults {
            if self.explicit.contains_key(key) {
                continue;
            }
            let Some(value) = attributes.get(key) else {
                continue;
            };
            let mut candidates = value.listify_strings();
            let Some(last) = candidates.last() else {
                log::debug!("No default for '{key}' to derive a sample file from");
                continue;
            };
            let sample = sample_config_dir.join(format!("{last}.sample"));
            candidates.push(sample.to_string_lossy().into_owned());
            attributes.set(key, Value::from(candidates));
        }
    }

    /// Narrow resolved candidate lists for unset options.
    ///
    /// Sample-file options that are not listify options take the first
    /// existing candidate, else the last one. Listify options keep all their
    /// candidates only if every one exists, else collapse to the last.
    pub fn select(&self, probe: &dyn PathProbe, attributes: &mut Attributes) {
        for key in &self.profile.add_sample_file_to_defaults {
            if self.explicit.contains_key(key) || self.profile.is_listify(key) {
                continue;
            }
            let Some(candidates) = attributes.get(key).map(Value::listify_strings) else {
                continue;
            };
            let chosen = candidates
                .iter()
                .find(|path| probe.exists(Path::new(path)))
                .or_else(|| candidates.last());
            if let Some(chosen) = chosen {
                let chosen = Value::from(chosen.as_str());
                attributes.set(key, chosen);
            }
        }

        for key in &self.profile.listify_options {
            if self.explicit.contains_key(key) {
                continue;
            }
            let Some(candidates) = attributes.get(key).map(Value::listify_strings) else {
                continue;
            };
            let all_exist = candidates.iter().all(|path| probe.exists(Path::new(path)));
            if !all_exist {
                if let Some(last) = candidates.last() {
                    let collapsed = Value::from(vec![last.as_str()]);
                    attributes.set(key, collapsed);
                }
            }
        }
    }
}
