use lander_shared::*;
use lander_sim::Episode;
use numpy::{PyArray1, PyArray2, PyArrayMethods, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use rayon::prelude::*;

fn value_error(e: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// Start from `config_json` (or the defaults) and apply selector overrides.
fn build_config(
    config_json: Option<&str>,
    action_space: Option<&str>,
    reward: Option<&str>,
    observation: Option<&str>,
) -> PyResult<SimConfig> {
    let mut config = match config_json {
        Some(json) => serde_json::from_str::<SimConfig>(json).map_err(value_error)?,
        None => SimConfig::default(),
    };
    if let Some(s) = action_space {
        config.action_space = s.parse().map_err(value_error)?;
    }
    if let Some(s) = reward {
        config.reward_policy = s.parse().map_err(value_error)?;
    }
    if let Some(s) = observation {
        config.observation_mode = s.parse().map_err(value_error)?;
    }
    config.validate().map_err(value_error)?;
    Ok(config)
}

/// Python ints may be negative or wider than an action id.
fn action_id(action: i64, config: &SimConfig) -> PyResult<u32> {
    u32::try_from(action).map_err(|_| {
        value_error(LanderError::InvalidAction {
            action,
            space: config.action_space,
            n_actions: config.action_space.n_actions(),
        })
    })
}

fn merge_rewards(
    mut w: RewardWeights,
    landed: Option<f32>,
    failed: Option<f32>,
    step: Option<f32>,
    distance: Option<f32>,
    speed: Option<f32>,
    tilt: Option<f32>,
) -> RewardWeights {
    if let Some(v) = landed { w.landed = v; }
    if let Some(v) = failed { w.failed = v; }
    if let Some(v) = step { w.step = v; }
    if let Some(v) = distance { w.distance = v; }
    if let Some(v) = speed { w.speed = v; }
    if let Some(v) = tilt { w.tilt = v; }
    w
}

// ---------------------------------------------------------------------------
// Single env
// ---------------------------------------------------------------------------

/// Gym-like environment wrapping one lander episode.
///
/// Usage:
///     env = LanderEnv(action_space="graded", reward="shaped", seed=42)
///     obs = env.reset()
///     obs, reward, terminated, truncated, info = env.step(3)
#[pyclass(unsendable)]
struct LanderEnv {
    episode: Episode,
}

#[pymethods]
impl LanderEnv {
    #[new]
    #[pyo3(signature = (action_space=None, reward=None, observation=None, seed=0, config=None))]
    fn new(
        action_space: Option<&str>,
        reward: Option<&str>,
        observation: Option<&str>,
        seed: u64,
        config: Option<&str>,
    ) -> PyResult<Self> {
        let config = build_config(config, action_space, reward, observation)?;
        let episode = Episode::new(config, seed).map_err(value_error)?;
        Ok(Self { episode })
    }

    /// Set reward weights. Keyword-only arguments; omitted weights keep their value.
    #[pyo3(signature = (landed=None, failed=None, step=None, distance=None, speed=None, tilt=None))]
    fn set_rewards(
        &mut self,
        landed: Option<f32>,
        failed: Option<f32>,
        step: Option<f32>,
        distance: Option<f32>,
        speed: Option<f32>,
        tilt: Option<f32>,
    ) -> PyResult<()> {
        let w = merge_rewards(self.episode.config().rewards, landed, failed, step, distance, speed, tilt);
        self.episode.set_rewards(w).map_err(value_error)
    }

    /// Reset the environment. Returns the observation (list of 7 floats).
    #[pyo3(signature = (seed=None))]
    fn reset(&mut self, seed: Option<u64>) -> Vec<f32> {
        self.episode.reset(seed).data.to_vec()
    }

    /// Step with an action id.
    /// Returns (obs, reward, terminated, truncated, info_dict).
    fn step<'py>(
        &mut self,
        py: Python<'py>,
        action: i64,
    ) -> PyResult<(Vec<f32>, f32, bool, bool, Bound<'py, PyDict>)> {
        let action = action_id(action, self.episode.config())?;
        let outcome = self.episode.step(action).map_err(value_error)?;

        let info = PyDict::new_bound(py);
        info.set_item("status", outcome.status.label())?;
        info.set_item("reason", outcome.status.crash_reason().map(|r| r.describe()))?;
        info.set_item("steps", self.episode.steps())?;

        Ok((
            outcome.observation.data.to_vec(),
            outcome.reward,
            outcome.terminated,
            outcome.truncated,
            info,
        ))
    }

    /// Snapshot of the craft and pad for a renderer.
    fn state<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let lander = self.episode.lander();
        let pad = self.episode.pad();
        let d = PyDict::new_bound(py);
        d.set_item("step", self.episode.steps())?;
        d.set_item("x", lander.position.x)?;
        d.set_item("y", lander.position.y)?;
        d.set_item("vx", lander.velocity.x)?;
        d.set_item("vy", lander.velocity.y)?;
        d.set_item("angle", lander.angle)?;
        d.set_item("width", lander.width)?;
        d.set_item("height", lander.height)?;
        d.set_item("pad_x", pad.x)?;
        d.set_item("pad_y", pad.y)?;
        d.set_item("pad_width", pad.width)?;
        d.set_item("pad_height", pad.height)?;
        d.set_item("status", self.episode.status().label())?;
        Ok(d)
    }

    /// Current configuration as JSON.
    fn config_json(&self) -> PyResult<String> {
        serde_json::to_string(self.episode.config()).map_err(value_error)
    }

    #[getter]
    fn obs_size(&self) -> usize {
        OBS_SIZE
    }

    #[getter]
    fn n_actions(&self) -> u32 {
        self.episode.config().action_space.n_actions()
    }

    #[getter]
    fn steps(&self) -> u32 {
        self.episode.steps()
    }

    #[getter]
    fn status(&self) -> &'static str {
        self.episode.status().label()
    }
}

// ---------------------------------------------------------------------------
// BatchEnv: rayon-parallel vectorized environment
// ---------------------------------------------------------------------------

/// Result of stepping a single env (plain data, no Python objects).
struct StepResult {
    outcome: StepOutcome,
    steps: u32,
    /// Observation after auto-reset, when the episode finished.
    reset_obs: Option<Observation>,
}

/// Vectorized environment that steps all N episodes in parallel using Rayon.
///
/// Usage:
///     batch = BatchEnv(64, action_space="graded", seed=7)
///     obs = batch.reset()                           # (64, 7) float32
///     obs, rewards, terminated, truncated, infos = batch.step(actions)  # actions: (64,) int64
///
/// Finished episodes are reset in the same call; their info dict carries the
/// final status and the last observation before the reset.
#[pyclass(unsendable)]
struct BatchEnv {
    envs: Vec<Episode>,
    n_envs: usize,
    config: SimConfig,
    rng: Pcg64,
}

impl BatchEnv {
    fn draw_seeds(&mut self, n: usize) -> Vec<u64> {
        (0..n).map(|_| self.rng.gen::<u64>()).collect()
    }

    fn write_obs(buf: &mut [f32], i: usize, obs: &Observation) {
        buf[i * OBS_SIZE..(i + 1) * OBS_SIZE].copy_from_slice(&obs.data);
    }
}

#[pymethods]
impl BatchEnv {
    #[new]
    #[pyo3(signature = (n_envs, action_space=None, reward=None, observation=None, seed=0, config=None))]
    fn new(
        n_envs: usize,
        action_space: Option<&str>,
        reward: Option<&str>,
        observation: Option<&str>,
        seed: u64,
        config: Option<&str>,
    ) -> PyResult<Self> {
        if n_envs == 0 {
            return Err(PyValueError::new_err("n_envs must be at least 1"));
        }
        let config = build_config(config, action_space, reward, observation)?;

        let mut rng = Pcg64::seed_from_u64(seed);
        let envs = (0..n_envs)
            .map(|_| Episode::new(config, rng.gen::<u64>()).map_err(value_error))
            .collect::<PyResult<Vec<_>>>()?;

        Ok(Self {
            envs,
            n_envs,
            config,
            rng,
        })
    }

    /// Set reward weights on every env.
    #[pyo3(signature = (landed=None, failed=None, step=None, distance=None, speed=None, tilt=None))]
    fn set_rewards(
        &mut self,
        landed: Option<f32>,
        failed: Option<f32>,
        step: Option<f32>,
        distance: Option<f32>,
        speed: Option<f32>,
        tilt: Option<f32>,
    ) -> PyResult<()> {
        let w = merge_rewards(self.config.rewards, landed, failed, step, distance, speed, tilt);
        // Checked once up front so a bad weight leaves every env untouched.
        let candidate = SimConfig { rewards: w, ..self.config };
        candidate.validate().map_err(value_error)?;
        self.config = candidate;
        for env in &mut self.envs {
            env.set_rewards(w).map_err(value_error)?;
        }
        Ok(())
    }

    /// Reset all environments. Returns obs as numpy array (n_envs, OBS_SIZE).
    fn reset<'py>(&mut self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<f32>>> {
        // Seeds are drawn sequentially so the batch is reproducible.
        let seeds = self.draw_seeds(self.n_envs);

        let observations: Vec<Observation> = self
            .envs
            .par_iter_mut()
            .zip(seeds.into_par_iter())
            .map(|(env, seed)| env.reset(Some(seed)))
            .collect();

        let obs_py = PyArray2::<f32>::zeros_bound(py, [self.n_envs, OBS_SIZE], false);
        unsafe {
            let buf = obs_py.as_slice_mut().map_err(value_error)?;
            for (i, obs) in observations.iter().enumerate() {
                Self::write_obs(buf, i, obs);
            }
        }
        Ok(obs_py)
    }

    /// Step all environments in parallel.
    ///
    /// Args:
    ///     actions: numpy array (n_envs,) int64
    ///
    /// Returns: (obs, rewards, terminated, truncated, infos)
    ///     obs:        numpy (n_envs, OBS_SIZE) float32, post-reset for finished envs
    ///     rewards:    numpy (n_envs,) float32
    ///     terminated: numpy (n_envs,) bool
    ///     truncated:  numpy (n_envs,) bool
    ///     infos:      list of n_envs dicts (only populated for finished envs)
    #[allow(clippy::type_complexity)]
    fn step<'py>(
        &mut self,
        py: Python<'py>,
        actions: PyReadonlyArray1<i64>,
    ) -> PyResult<(
        Bound<'py, PyArray2<f32>>,
        Bound<'py, PyArray1<f32>>,
        Bound<'py, PyArray1<bool>>,
        Bound<'py, PyArray1<bool>>,
        Bound<'py, PyList>,
    )> {
        let actions_arr = actions.as_array();
        if actions_arr.len() != self.n_envs {
            return Err(PyValueError::new_err(format!(
                "expected {} actions, got {}",
                self.n_envs,
                actions_arr.len()
            )));
        }

        // Validate everything up front so a bad id leaves every env untouched.
        let n_actions = self.config.action_space.n_actions();
        let action_ids = actions_arr
            .iter()
            .map(|&a| {
                let id = action_id(a, &self.config)?;
                if id >= n_actions {
                    return Err(value_error(LanderError::InvalidAction {
                        action: a,
                        space: self.config.action_space,
                        n_actions,
                    }));
                }
                Ok(id)
            })
            .collect::<PyResult<Vec<u32>>>()?;

        // Reset seeds for envs that finish this step are drawn after the
        // parallel section, in env order.
        let outcomes = self
            .envs
            .par_iter_mut()
            .zip(action_ids.into_par_iter())
            .map(|(env, action)| env.step(action))
            .collect::<Result<Vec<StepOutcome>, LanderError>>()
            .map_err(value_error)?;

        let reset_seeds: Vec<Option<u64>> = outcomes
            .iter()
            .map(|o| o.status.is_terminal().then(|| self.rng.gen::<u64>()))
            .collect();

        let results: Vec<StepResult> = self
            .envs
            .par_iter_mut()
            .zip(outcomes.into_par_iter())
            .zip(reset_seeds.into_par_iter())
            .map(|((env, outcome), seed)| {
                let steps = env.steps();
                let reset_obs = seed.map(|s| env.reset(Some(s)));
                StepResult {
                    outcome,
                    steps,
                    reset_obs,
                }
            })
            .collect();

        let obs_py = PyArray2::<f32>::zeros_bound(py, [self.n_envs, OBS_SIZE], false);
        let rew_py = PyArray1::<f32>::zeros_bound(py, self.n_envs, false);
        let term_py = PyArray1::<bool>::zeros_bound(py, self.n_envs, false);
        let trunc_py = PyArray1::<bool>::zeros_bound(py, self.n_envs, false);

        unsafe {
            let obs_buf = obs_py.as_slice_mut().map_err(value_error)?;
            let rew_buf = rew_py.as_slice_mut().map_err(value_error)?;
            let term_buf = term_py.as_slice_mut().map_err(value_error)?;
            let trunc_buf = trunc_py.as_slice_mut().map_err(value_error)?;

            for (i, result) in results.iter().enumerate() {
                let obs = result.reset_obs.as_ref().unwrap_or(&result.outcome.observation);
                Self::write_obs(obs_buf, i, obs);
                rew_buf[i] = result.outcome.reward;
                term_buf[i] = result.outcome.terminated;
                trunc_buf[i] = result.outcome.truncated;
            }
        }

        // Only build dict contents for finished envs to minimize overhead.
        let info_list = PyList::empty_bound(py);
        for result in &results {
            let info = PyDict::new_bound(py);
            if result.reset_obs.is_some() {
                let status = result.outcome.status;
                info.set_item("status", status.label())?;
                info.set_item("reason", status.crash_reason().map(|r| r.describe()))?;
                info.set_item("steps", result.steps)?;
                info.set_item("final_observation", result.outcome.observation.data.to_vec())?;
            }
            info_list.append(info)?;
        }

        Ok((obs_py, rew_py, term_py, trunc_py, info_list))
    }

    /// Number of environments.
    #[getter]
    fn n(&self) -> usize {
        self.n_envs
    }

    #[getter]
    fn obs_size(&self) -> usize {
        OBS_SIZE
    }

    #[getter]
    fn n_actions(&self) -> u32 {
        self.config.action_space.n_actions()
    }
}

/// Default configuration as JSON, for editing and passing back as `config=`.
#[pyfunction]
fn default_config() -> PyResult<String> {
    serde_json::to_string_pretty(&SimConfig::default()).map_err(value_error)
}

/// Python module definition.
#[pymodule]
fn lander_pyenv(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<LanderEnv>()?;
    m.add_class::<BatchEnv>()?;
    m.add_function(wrap_pyfunction!(default_config, m)?)?;
    m.add("OBS_SIZE", OBS_SIZE)?;
    m.add("SIMPLE_ACTIONS", SIMPLE_ACTIONS)?;
    m.add("GRADED_ACTIONS", GRADED_ACTIONS)?;
    Ok(())
}
