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

//! Typed descriptor schemas, validated once at parse time

pub mod application;
pub mod asset;
pub mod container;
pub mod scalar;

pub use self::application::{ApplicationDescriptor, HostAliasDescriptor, RegistryDescriptor};
pub use self::asset::{AssetDescriptor, SharedAssetsDescriptor};
pub use self::container::{
    BoundsDescriptor, ContainerDescriptor, EnvVarDescriptor, EnvVarSource, ExposeDescriptor,
    ExternalDescriptor, HealthDescriptor, HealthPath, HttpCheckDescriptor, HttpHostDescriptor,
    HttpsHostDescriptor, PortDescriptor, ProbeDescriptor, StartupDescriptor,
};
