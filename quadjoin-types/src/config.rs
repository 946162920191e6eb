//! Tuning knobs for building the quadtree and running a join.
use serde::de::Error;
use serde::{Deserialize, Serialize};

/// Deepest tree the engine will build by default. The root is depth 1.
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Default density threshold: a cell holding at most this many points is not
/// subdivided further.
pub const DEFAULT_LEAF_CAPACITY: usize = 15;

/// Subtrees with at least this many points are built on separate rayon tasks.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4096;

/// What to do with a polygon or point whose geometry is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Leave the offending geometry out, record the error and keep going
    #[default]
    Skip,
    /// Fail the whole batch on the first malformed geometry
    Abort,
}

/// Join configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JoinConfig {
    /// Maximum number of tree levels, root included. `1` means a single leaf.
    #[serde(default = "JoinConfig::default_max_depth")]
    pub max_depth: usize,

    /// Largest point count a cell may hold before it is split.
    #[serde(default = "JoinConfig::default_leaf_capacity")]
    pub leaf_capacity: usize,

    /// Minimum subtree size that justifies forking construction work.
    #[serde(default = "JoinConfig::default_parallel_threshold")]
    pub parallel_threshold: usize,

    /// Upper bound on candidate pairs a single query may refine.
    #[serde(default)]
    pub max_candidates: Option<usize>,

    #[serde(default)]
    pub error_policy: ErrorPolicy,
}

impl JoinConfig {
    const fn default_max_depth() -> usize {
        DEFAULT_MAX_DEPTH
    }

    const fn default_leaf_capacity() -> usize {
        DEFAULT_LEAF_CAPACITY
    }

    const fn default_parallel_threshold() -> usize {
        DEFAULT_PARALLEL_THRESHOLD
    }

    /// Config whose depth limit fits `num_points` uniformly spread points.
    ///
    /// Picks the shallowest depth at which a uniform spread would already fit
    /// every leaf under the default capacity, capped at [`DEFAULT_MAX_DEPTH`].
    ///
    /// # Examples
    ///
    /// ```
    /// use quadjoin_types::config::JoinConfig;
    ///
    /// assert_eq!(JoinConfig::for_point_count(10).max_depth, 1);
    /// assert_eq!(JoinConfig::for_point_count(10_000).max_depth, 6);
    /// ```
    pub fn for_point_count(num_points: usize) -> Self {
        let config = Self::default();
        let max_depth = derive_max_depth(num_points, config.leaf_capacity);
        config.with_max_depth(max_depth)
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_leaf_capacity(mut self, leaf_capacity: usize) -> Self {
        self.leaf_capacity = leaf_capacity;
        self
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    pub fn with_max_candidates(mut self, limit: usize) -> Self {
        self.max_candidates = Some(limit);
        self
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_depth == 0 {
            return Err("max_depth must be greater than zero".to_string());
        }

        if self.leaf_capacity == 0 {
            return Err("leaf_capacity must be greater than zero".to_string());
        }

        if self.max_depth > 64 {
            return Err(format!(
                "max_depth of {} exceeds the supported limit of 64",
                self.max_depth
            ));
        }

        if let Some(0) = self.max_candidates {
            return Err("max_candidates must be greater than zero when set".to_string());
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: JoinConfig = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: JoinConfig = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            max_depth: Self::default_max_depth(),
            leaf_capacity: Self::default_leaf_capacity(),
            parallel_threshold: Self::default_parallel_threshold(),
            max_candidates: None,
            error_policy: ErrorPolicy::default(),
        }
    }
}

/// Smallest depth `d` (root = 1) for which `num_points / 4^(d-1)` fits in
/// `leaf_capacity`, clamped to `1..=DEFAULT_MAX_DEPTH`.
pub fn derive_max_depth(num_points: usize, leaf_capacity: usize) -> usize {
    let capacity = leaf_capacity.max(1) as f64;
    let mut depth = 1;
    let mut per_leaf = num_points as f64;
    while per_leaf > capacity && depth < DEFAULT_MAX_DEPTH {
        per_leaf /= 4.0;
        depth += 1;
    }
    depth
}
