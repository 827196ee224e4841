//! 端点投影
//!
//! 把导出某个服务的 revision 集合展开成端点列表。同一轮归并内，协议相同且
//! revision 集合内容相同的服务共享一次展开结果（实例地址 + 协议端口），
//! 再各自套上自己的服务描述。缓存只在一轮内有效。

use std::collections::HashMap;
use std::sync::Arc;

use crate::discovery::endpoint::{Endpoint, REGISTRY_INSTANCE, REGISTRY_TYPE_KEY};
use crate::discovery::metadata::{RevisionSet, ServiceDescriptor};
use crate::discovery::reducer::{Reduction, ResolvedInstance};

/// 某协议下可达的实例地址
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reachable {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ProjectionKey {
    protocol: String,
    revisions: RevisionSet,
}

/// 端点投影器，每轮归并新建一个
#[derive(Debug, Default)]
pub struct EndpointProjector {
    cache: HashMap<ProjectionKey, Arc<Vec<Reachable>>>,
    hits: usize,
    misses: usize,
}

impl EndpointProjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// 展开单个服务描述
    pub fn project(
        &mut self,
        service: &ServiceDescriptor,
        revisions: &RevisionSet,
        revision_to_instances: &HashMap<String, Vec<ResolvedInstance>>,
    ) -> Vec<Endpoint> {
        let reachable = self.reachable(&service.protocol, revisions, revision_to_instances);
        reachable
            .iter()
            .map(|r| {
                let mut endpoint = Endpoint::new(r.host.clone(), r.port, service);
                endpoint.set_param(REGISTRY_TYPE_KEY, REGISTRY_INSTANCE);
                endpoint
            })
            .collect()
    }

    /// 展开整轮归并结果，得到 服务名 -> 端点列表
    ///
    /// 同名但 group / version / 协议不同的描述按描述顺序拼接
    pub fn project_reduction(&mut self, reduction: &Reduction) -> HashMap<String, Arc<Vec<Endpoint>>> {
        let mut by_name: HashMap<String, Vec<Endpoint>> = HashMap::new();
        for (service, revisions) in &reduction.service_to_revisions {
            let endpoints = self.project(service, revisions, &reduction.revision_to_instances);
            by_name
                .entry(service.name.clone())
                .or_default()
                .extend(endpoints);
        }
        by_name
            .into_iter()
            .map(|(name, endpoints)| (name, Arc::new(endpoints)))
            .collect()
    }

    /// 命中缓存的次数
    pub fn cache_hits(&self) -> usize {
        self.hits
    }

    /// 实际展开的次数
    pub fn cache_misses(&self) -> usize {
        self.misses
    }

    fn reachable(
        &mut self,
        protocol: &str,
        revisions: &RevisionSet,
        revision_to_instances: &HashMap<String, Vec<ResolvedInstance>>,
    ) -> Arc<Vec<Reachable>> {
        let key = ProjectionKey {
            protocol: protocol.to_string(),
            revisions: revisions.clone(),
        };
        if let Some(cached) = self.cache.get(&key) {
            self.hits += 1;
            return cached.clone();
        }

        self.misses += 1;
        let mut reachable = Vec::with_capacity(8);
        for revision in revisions.iter() {
            let Some(instances) = revision_to_instances.get(revision) else {
                continue;
            };
            for resolved in instances {
                let instance = &resolved.instance;
                reachable.extend(instance.ports_for(protocol).into_iter().map(|port| Reachable {
                    host: instance.host.clone(),
                    port,
                }));
            }
        }

        let reachable = Arc::new(reachable);
        self.cache.insert(key, reachable.clone());
        reachable
    }
}
