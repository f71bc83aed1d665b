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

pub mod container;
pub mod env;
pub mod probe;
pub mod resources;
pub mod volumes;

pub use self::container::ContainerBuilder;
pub use self::env::EnvironmentBuilder;
pub use self::probe::{build_health, build_probes, ContainerProbes, ProbeCheck};
pub use self::resources::build_resources;
pub use self::volumes::{build_volume, build_volume_mount, build_volume_mounts, build_volumes};
