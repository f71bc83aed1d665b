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

//! Typed builders for every generated document kind

pub mod budget;
pub mod configmap;
pub mod ingress;
pub mod labels;
pub mod pod;
pub mod service;
pub mod traits;
pub mod workload;

pub use self::budget::BudgetBuilder;
pub use self::configmap::ConfigMapBuilder;
pub use self::ingress::{ExternalBuilder, Route};
pub use self::labels::{created_at_label, ResourceLabels};
pub use self::service::{group_exposed_ports, ExposedPort, ServiceBuilder, ServiceGroup};
pub use self::traits::LabeledResourceBuilder;
pub use self::workload::WorkloadBuilder;
