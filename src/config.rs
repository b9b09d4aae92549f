// pcmctl - path capacity reporting for cloud-managed SD-WAN controllers
// Copyright (C) 2025 pcmctl authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

pub const DEFAULT_CONTROLLER: &str = "https://api.elcapitan.cloudgenix.com";

/// Optional settings file. Local scope is `.pcmctl.yaml` in the invocation
/// directory; user scope lives under the platform config dir.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    pub controller: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub auth_token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Local,
    User,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not locate a config directory for the current user")]
    MissingConfigDir,
}

/// Fully resolved login inputs. `auth_token` wins over email/password unless
/// credentials were passed explicitly on the command line.
#[derive(Debug)]
pub struct Credentials {
    pub controller: String,
    pub email: Option<String>,
    pub password: Option<String>,
    pub auth_token: Option<String>,
}

pub fn config_path(scope: Scope, cwd: &Path) -> Result<PathBuf> {
    match scope {
        Scope::Local => Ok(cwd.join(".pcmctl.yaml")),
        Scope::User => {
            if let Ok(custom) = env::var("PCMCTL_CONFIG_DIR") {
                return Ok(PathBuf::from(custom).join("config.yaml"));
            }
            let base = config_dir().ok_or(ConfigError::MissingConfigDir)?;
            Ok(base.join("pcmctl").join("config.yaml"))
        }
    }
}

pub fn load(cwd: &Path) -> Result<Config> {
    let user = read_if_exists(&config_path(Scope::User, cwd)?)?.unwrap_or_default();
    let local = read_if_exists(&config_path(Scope::Local, cwd)?)?.unwrap_or_default();
    Ok(merge(user, local))
}

/// Merge CLI overrides, environment token variables, and the settings files
/// into one credential set. Token precedence: `X_AUTH_TOKEN`, `AUTH_TOKEN`,
/// then the settings file.
pub fn resolve(
    cwd: &Path,
    controller_override: Option<String>,
    email_override: Option<String>,
    password_override: Option<String>,
) -> Result<Credentials> {
    let merged = load(cwd)?;

    let auth_token = env::var("X_AUTH_TOKEN")
        .or_else(|_| env::var("AUTH_TOKEN"))
        .ok()
        .or(merged.auth_token);

    Ok(Credentials {
        controller: controller_override
            .or(merged.controller)
            .unwrap_or_else(|| DEFAULT_CONTROLLER.to_string()),
        email: email_override.or(merged.email),
        password: password_override.or(merged.password),
        auth_token,
    })
}

fn read_if_exists(path: &Path) -> Result<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    let config = serde_yaml::from_str(&contents).with_context(|| format!("parsing {:?}", path))?;
    Ok(Some(config))
}

fn merge(user: Config, local: Config) -> Config {
    Config {
        controller: local.controller.or(user.controller),
        email: local.email.or(user.email),
        password: local.password.or(user.password),
        auth_token: local.auth_token.or(user.auth_token),
    }
}
