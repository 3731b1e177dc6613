//! Construction of [`AppConfig`] values.
//!
//! Building runs these stages in order:
//!
//! 1. Collect explicit options: the configuration file, then programmatic
//!    options on top, then environment overrides.
//! 2. Preprocess explicit options (renamed options, database URLs).
//! 3. Work out the root and the base directories.
//! 4. Merge explicit options over schema defaults into the raw configuration.
//! 5. Materialize the raw configuration as attributes.
//! 6. Append sample files to the defaults of unset sample-file options.
//! 7. Resolve path options, retrying explicitly set ones against the root.
//! 8. Select among sample candidates and apply deprecated locations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::app::AppConfig;
use crate::config::attributes::Attributes;
use crate::config::environment::EnvironmentOverrides;
use crate::config::loader::ConfigFileLoader;
use crate::config::merger::ConfigMerger;
use crate::config::profile::AppProfile;
use crate::diagnostics::{ConfigWarning, Diagnostics};
use crate::error::Result;
use crate::path::{BaseDirectories, FsProbe, OptionPathResolver, PathProbe, RootFallback, SampleSelector};
use crate::schema::Schema;
use crate::value::{Options, Value};

/// Where environment overrides come from.
enum EnvSource {
    Skip,
    Process,
    Vars(Vec<(String, String)>),
}

/// Builder for [`AppConfig`].
///
/// # Examples
///
/// ```
/// use appconf::config::AppConfigBuilder;
/// use appconf::schema::{OptionSpec, OptionType, Schema};
///
/// let schema = Schema::new("demo", vec![
///     OptionSpec::new("config_dir", OptionType::Path),
///     OptionSpec::new("job_config_file", OptionType::Path)
///         .with_default("job_conf.yml")
///         .resolves_against("config_dir"),
///     OptionSpec::new("workers", OptionType::Int).with_default(1i64),
/// ]).unwrap();
///
/// let config = AppConfigBuilder::new(schema)
///     .with_root("/srv/demo")
///     .with_option("workers", "4")
///     .build()
///     .unwrap();
///
/// assert_eq!(config.int_value("workers"), Some(4));
/// assert!(config.is_set("workers"));
/// assert!(!config.is_set("job_config_file"));
/// assert!(config.path("job_config_file").unwrap().ends_with("config/job_conf.yml"));
/// ```
pub struct AppConfigBuilder {
    schema: Arc<Schema>,
    profile: AppProfile,
    options: Options,
    root: Option<PathBuf>,
    config_file: Option<PathBuf>,
    discover_config_file: bool,
    sample_config_dir: Option<PathBuf>,
    probe: Arc<dyn PathProbe>,
    env: EnvSource,
}

impl AppConfigBuilder {
    /// Start building a configuration for `schema`.
    ///
    /// By default no configuration file is read, environment overrides are
    /// skipped and existence checks use the real filesystem.
    #[must_use]
    pub fn new(schema: impl Into<Arc<Schema>>) -> Self {
        Self {
            schema: schema.into(),
            profile: AppProfile::default(),
            options: Options::new(),
            root: None,
            config_file: None,
            discover_config_file: false,
            sample_config_dir: None,
            probe: Arc::new(FsProbe),
            env: EnvSource::Skip,
        }
    }

    /// Use an application profile.
    #[must_use]
    pub fn with_profile(mut self, profile: AppProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Set the application root.
    ///
    /// Without this the `root_dir` option is used, else the current directory.
    #[must_use]
    pub fn with_root(mut self, root: impl AsRef<Path>) -> Self {
        self.root = Some(root.as_ref().to_path_buf());
        self
    }

    /// Set one explicit option.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Set several explicit options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options.extend(options);
        self
    }

    /// Read explicit options from a configuration file.
    ///
    /// Programmatic options take precedence over the file's.
    #[must_use]
    pub fn with_config_file(mut self, path: impl AsRef<Path>) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Look for a configuration file under the root when none is given.
    #[must_use]
    pub fn discover_config_file(mut self) -> Self {
        self.discover_config_file = true;
        self
    }

    /// Override the bundled sample directory.
    #[must_use]
    pub fn with_sample_config_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.sample_config_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use a custom existence probe.
    #[must_use]
    pub fn with_probe(mut self, probe: impl PathProbe + 'static) -> Self {
        self.probe = Arc::new(probe);
        self
    }

    /// Apply overrides from the process environment.
    ///
    /// Has no effect unless the profile names an environment prefix.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        self.env = EnvSource::Process;
        self
    }

    /// Apply overrides from the given variables instead of the process
    /// environment.
    #[must_use]
    pub fn with_env_vars<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.env = EnvSource::Vars(vars.into_iter().collect());
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be loaded, an
    /// explicit value is invalid, an option collides with a reserved
    /// attribute, or path resolution fails.
    pub fn build(self) -> Result<AppConfig> {
        let Self {
            schema,
            profile,
            options,
            root,
            config_file,
            discover_config_file,
            sample_config_dir,
            probe,
            env,
        } = self;
        let mut diagnostics = Diagnostics::new();

        let config_file = config_file.or_else(|| {
            if !discover_config_file {
                return None;
            }
            let search_root = root
                .clone()
                .or_else(|| options.get("root_dir").and_then(Value::as_path))
                .unwrap_or_else(|| PathBuf::from("."));
            ConfigFileLoader::find_config_file(&search_root, schema.app_name())
        });

        let mut kwargs = match &config_file {
            Some(path) => ConfigFileLoader::load_file(path, schema.app_name())?,
            None => {
                log::debug!("No configuration file, using explicit options only");
                Options::new()
            }
        };
        kwargs.extend(options);

        if let Some(prefix) = profile.env_prefix.as_deref() {
            match env {
                EnvSource::Skip => {}
                EnvSource::Process => {
                    EnvironmentOverrides::apply(prefix, &schema, &mut kwargs);
                }
                EnvSource::Vars(vars) => {
                    EnvironmentOverrides::apply_from(vars, prefix, &schema, &mut kwargs);
                }
            }
        }

        ConfigMerger::preprocess(&mut kwargs, &profile, &mut diagnostics);

        let root = root
            .or_else(|| kwargs.get("root_dir").and_then(Value::as_path))
            .unwrap_or_else(|| PathBuf::from("."));
        let dirs = BaseDirectories::resolve(
            &root,
            &kwargs,
            config_file.as_deref(),
            sample_config_dir.as_deref(),
            profile.layout,
        )?;

        let raw = ConfigMerger::merge(&schema, &profile, &kwargs, &mut diagnostics)?;

        let mut attributes = Attributes::seeded(&dirs, config_file.as_deref());
        attributes.materialize(&raw)?;

        let samples = SampleSelector::new(&profile, &kwargs);
        samples.expand_defaults(&dirs.sample_config_dir, &mut attributes);

        {
            let mut resolver = OptionPathResolver::new(&schema, &profile.listify_options);
            let fallback = RootFallback::new(&dirs.root, probe.as_ref());
            for spec in schema.options() {
                let Some(parent) = spec.resolves_against.as_deref() else {
                    continue;
                };
                resolver.resolve_option(&spec.name, &mut attributes)?;
                if kwargs.contains_key(&spec.name)
                    && profile.paths_to_check_against_root.contains(&spec.name)
                {
                    let initial = raw.get(&spec.name).cloned().unwrap_or_default();
                    fallback.check(&spec.name, parent, &initial, &mut attributes, &mut diagnostics);
                }
            }
            log::debug!("Resolved {} path option(s)", resolver.resolutions());
        }

        samples.select(probe.as_ref(), &mut attributes);
        Self::apply_deprecated_locations(&profile, &dirs.root, probe.as_ref(), &mut attributes, &mut diagnostics);

        Ok(AppConfig {
            schema,
            profile,
            explicit: kwargs,
            raw,
            attributes,
            root: dirs.root,
            config_file,
            probe,
            diagnostics,
        })
    }

    /// Adopt the first existing deprecated location for options whose
    /// resolved path is missing.
    fn apply_deprecated_locations(
        profile: &AppProfile,
        root: &Path,
        probe: &dyn PathProbe,
        attributes: &mut Attributes,
        diagnostics: &mut Diagnostics,
    ) {
        for (option, locations) in &profile.deprecated_locations {
            let Some(current) = attributes.get(option).and_then(Value::as_path) else {
                continue;
            };
            if probe.exists(&current) {
                continue;
            }
            let found = locations
                .iter()
                .map(|location| root.join(location))
                .find(|candidate| probe.exists(candidate));
            if let Some(path) = found {
                diagnostics.warn(ConfigWarning::DeprecatedLocation {
                    option: option.clone(),
                    path: path.clone(),
                });
                attributes.set(option, Value::from(path));
            }
        }
    }
}
