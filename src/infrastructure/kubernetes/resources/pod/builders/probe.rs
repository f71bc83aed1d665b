// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::descriptor::{HealthDescriptor, HealthPath, ProbeDescriptor};
use k8s_openapi::api::core::v1::{ExecAction, HTTPGetAction, Probe};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeCheck {
    Live,
    Ready,
    Start,
}

impl ProbeCheck {
    /// Key used in per-check path maps.
    pub fn key(&self) -> &'static str {
        match self {
            ProbeCheck::Live => "live",
            ProbeCheck::Ready => "ready",
            ProbeCheck::Start => "start",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerProbes {
    pub liveness: Option<Probe>,
    pub readiness: Option<Probe>,
    pub startup: Option<Probe>,
}

/// `health` yields liveness and readiness; entries of `probe` replace them
/// and may add a startup probe.
pub fn build_probes(health: Option<&HealthDescriptor>, probe: Option<&ProbeDescriptor>) -> ContainerProbes {
    let mut probes = ContainerProbes::default();

    if let Some(health) = health {
        probes.liveness = build_health(health, ProbeCheck::Live);
        probes.readiness = build_health(health, ProbeCheck::Ready);
    }

    if let Some(probe) = probe {
        if let Some(live) = &probe.live {
            probes.liveness = build_health(live, ProbeCheck::Live);
        }
        if let Some(ready) = &probe.ready {
            probes.readiness = build_health(ready, ProbeCheck::Ready);
        }
        if let Some(start) = &probe.start {
            probes.startup = build_health(start, ProbeCheck::Start);
        }
    }

    probes
}

/// HTTP wins over command. Without either no probe is produced.
pub fn build_health(health: &HealthDescriptor, check: ProbeCheck) -> Option<Probe> {
    let mut probe = if let Some(http) = &health.http {
        let path = match &http.path {
            Some(HealthPath::Single(path)) => Some(path.clone()),
            Some(HealthPath::PerCheck(paths)) => paths.get(check.key()).cloned(),
            None => None,
        };
        Probe {
            http_get: Some(HTTPGetAction {
                path,
                port: http.port.clone(),
                ..Default::default()
            }),
            ..Default::default()
        }
    } else if !health.command.is_empty() {
        Probe {
            exec: Some(ExecAction {
                command: Some(health.command.clone()),
            }),
            ..Default::default()
        }
    } else {
        return None;
    };

    probe.initial_delay_seconds = health.delay;
    probe.period_seconds = health.period;
    probe.timeout_seconds = health.timeout;
    probe.success_threshold = health.success;
    probe.failure_threshold = health.failure;
    Some(probe)
}
