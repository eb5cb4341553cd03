//! user_id 与端口的随机来源

use crate::config::{AllocationConfig, ConfigError};
use rand::Rng;
use std::ops::RangeInclusive;

/// 标识来源
pub trait IdSource: Send + Sync {
    fn draw_user_id(&self) -> String;
    fn draw_port(&self) -> u16;
}

/// 在配置区间内均匀随机抽取
#[derive(Debug, Clone)]
pub struct RandomIdSource {
    user_ids: RangeInclusive<u32>,
    ports: RangeInclusive<u16>,
}

impl RandomIdSource {
    /// 空区间直接拒绝，抽取时不会再因区间无效而 panic
    pub fn new(
        user_ids: RangeInclusive<u32>,
        ports: RangeInclusive<u16>,
    ) -> Result<Self, ConfigError> {
        if user_ids.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "user_id 区间无效: {:?}",
                user_ids
            )));
        }
        if ports.is_empty() {
            return Err(ConfigError::Invalid(format!("端口区间无效: {:?}", ports)));
        }
        Ok(Self { user_ids, ports })
    }

    pub fn from_config(config: &AllocationConfig) -> Result<Self, ConfigError> {
        Self::new(
            config.user_id_min..=config.user_id_max,
            config.port_min..=config.port_max,
        )
    }
}

impl Default for RandomIdSource {
    fn default() -> Self {
        let config = AllocationConfig::default();
        Self {
            user_ids: config.user_id_min..=config.user_id_max,
            ports: config.port_min..=config.port_max,
        }
    }
}

impl IdSource for RandomIdSource {
    fn draw_user_id(&self) -> String {
        rand::thread_rng().gen_range(self.user_ids.clone()).to_string()
    }

    fn draw_port(&self) -> u16 {
        rand::thread_rng().gen_range(self.ports.clone())
    }
}

/// 按预设顺序返回标识，预设用完后回落到随机来源
#[cfg(test)]
pub(crate) struct ScriptedIdSource {
    draws: std::sync::Mutex<std::collections::VecDeque<(String, u16)>>,
    fallback: RandomIdSource,
}

#[cfg(test)]
impl ScriptedIdSource {
    pub(crate) fn new(draws: &[(&str, u16)]) -> Self {
        Self {
            draws: std::sync::Mutex::new(
                draws
                    .iter()
                    .map(|(user_id, port)| (user_id.to_string(), *port))
                    .collect(),
            ),
            fallback: RandomIdSource::default(),
        }
    }
}

#[cfg(test)]
impl IdSource for ScriptedIdSource {
    fn draw_user_id(&self) -> String {
        let draws = self.draws.lock().unwrap();
        match draws.front() {
            Some((user_id, _)) => user_id.clone(),
            None => self.fallback.draw_user_id(),
        }
    }

    fn draw_port(&self) -> u16 {
        let mut draws = self.draws.lock().unwrap();
        match draws.pop_front() {
            Some((_, port)) => port,
            None => self.fallback.draw_port(),
        }
    }
}
