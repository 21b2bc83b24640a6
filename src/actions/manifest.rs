//! Cluster-API manifest for a bring-your-own-host cluster
//!
//! The manifest is a fixed multi-document template with four substitution
//! points. Substitution is textual: values are inserted verbatim and are not
//! quoted or escaped, so they must not contain characters that break YAML.

use crate::actions::ActionError;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::sync::OnceLock;

/// Kubeconfig used to reach the API server from a control-plane node
pub const ADMIN_KUBECONFIG: &str = "/etc/kubernetes/admin.conf";

/// Parameters substituted into the cluster manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestParams {
    /// Replica count of the worker machine deployment
    pub worker_replicas: String,

    /// Replica count of the control-plane pool
    pub controller_replicas: String,

    /// Control-plane endpoint, also used as the kube-vip virtual IP
    pub target_address: String,

    /// Kubernetes version of both pools
    pub kubernetes_version: String,
}

impl ManifestParams {
    pub fn new(
        worker_replicas: impl Into<String>,
        controller_replicas: impl Into<String>,
        target_address: impl Into<String>,
        kubernetes_version: impl Into<String>,
    ) -> Self {
        Self {
            worker_replicas: worker_replicas.into(),
            controller_replicas: controller_replicas.into(),
            target_address: target_address.into(),
            kubernetes_version: kubernetes_version.into(),
        }
    }

    fn value_for(&self, placeholder: &str) -> &str {
        match placeholder {
            "worker_replicas" => &self.worker_replicas,
            "controller_replicas" => &self.controller_replicas,
            "control_plane_endpoint" => &self.target_address,
            _ => &self.kubernetes_version,
        }
    }

    /// Render the manifest document
    ///
    /// All placeholders are replaced in a single pass, so a value that
    /// itself looks like a placeholder is inserted as-is.
    pub fn render(&self) -> String {
        placeholder_regex()
            .replace_all(CLUSTER_TEMPLATE, |caps: &Captures<'_>| {
                self.value_for(&caps[1]).to_string()
            })
            .into_owned()
    }

    /// Check that every parameter is well formed
    pub fn validate(&self) -> Result<(), ActionError> {
        parse_replicas("worker_replicas", &self.worker_replicas)?;
        let controllers = parse_replicas("controller_replicas", &self.controller_replicas)?;
        if controllers == 0 {
            return Err(invalid(
                "controller_replicas",
                &self.controller_replicas,
                "at least one control-plane replica is required",
            ));
        }

        let is_ip = self.target_address.parse::<IpAddr>().is_ok();
        if !is_ip && !hostname_regex().is_match(&self.target_address) {
            return Err(invalid(
                "target_address",
                &self.target_address,
                "expected an IP address or hostname",
            ));
        }

        if !version_regex().is_match(&self.kubernetes_version) {
            return Err(invalid(
                "kubernetes_version",
                &self.kubernetes_version,
                "expected a version like v1.22.4",
            ));
        }

        Ok(())
    }
}

fn parse_replicas(name: &'static str, value: &str) -> Result<u32, ActionError> {
    value
        .parse::<u32>()
        .map_err(|e| invalid(name, value, &e.to_string()))
}

fn invalid(name: &'static str, value: &str, reason: &str) -> ActionError {
    ActionError::InvalidParameter {
        name,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(
            r"\{\{ (worker_replicas|controller_replicas|control_plane_endpoint|kubernetes_version) \}\}",
        )
        .expect("placeholder pattern is valid")
    })
}

fn hostname_regex() -> &'static Regex {
    static HOSTNAME: OnceLock<Regex> = OnceLock::new();
    HOSTNAME.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$")
            .expect("hostname pattern is valid")
    })
}

fn version_regex() -> &'static Regex {
    static VERSION: OnceLock<Regex> = OnceLock::new();
    VERSION.get_or_init(|| {
        Regex::new(r"^v?\d+\.\d+\.\d+([-+][0-9A-Za-z.+-]+)?$").expect("version pattern is valid")
    })
}

const CLUSTER_TEMPLATE: &str = r#"apiVersion: bootstrap.cluster.x-k8s.io/v1beta1
kind: KubeadmConfigTemplate
metadata:
  name: byoh-cluster-md-0
  namespace: default
spec:
  template:
    spec: {}
---
apiVersion: cluster.x-k8s.io/v1beta1
kind: Cluster
metadata:
  labels:
    cni: byoh-cluster-crs-0
    crs: "true"
  name: byoh-cluster
  namespace: default
spec:
  clusterNetwork:
    pods:
      cidrBlocks:
      - 192.168.0.0/16
    serviceDomain: cluster.local
    services:
      cidrBlocks:
      - 10.128.0.0/12
  controlPlaneRef:
    apiVersion: controlplane.cluster.x-k8s.io/v1beta1
    kind: KubeadmControlPlane
    name: byoh-cluster-control-plane
  infrastructureRef:
    apiVersion: infrastructure.cluster.x-k8s.io/v1beta1
    kind: ByoCluster
    name: byoh-cluster
---
apiVersion: cluster.x-k8s.io/v1beta1
kind: MachineDeployment
metadata:
  name: byoh-cluster-md-0
  namespace: default
spec:
  clusterName: byoh-cluster
  replicas: {{ worker_replicas }}
  selector:
    matchLabels: null
  template:
    metadata:
      labels:
        nodepool: pool1
    spec:
      bootstrap:
        configRef:
          apiVersion: bootstrap.cluster.x-k8s.io/v1beta1
          kind: KubeadmConfigTemplate
          name: byoh-cluster-md-0
      clusterName: byoh-cluster
      infrastructureRef:
        apiVersion: infrastructure.cluster.x-k8s.io/v1beta1
        kind: ByoMachineTemplate
        name: byoh-cluster-md-0
      version: {{ kubernetes_version }}
---
apiVersion: controlplane.cluster.x-k8s.io/v1beta1
kind: KubeadmControlPlane
metadata:
  labels:
    nodepool: pool0
  name: byoh-cluster-control-plane
  namespace: default
spec:
  kubeadmConfigSpec:
    clusterConfiguration:
      apiServer:
        certSANs:
        - localhost
        - 127.0.0.1
        - 0.0.0.0
        - host.docker.internal
      controllerManager:
        extraArgs:
          enable-hostpath-provisioner: "true"
    files:
    - content: |
        apiVersion: v1
        kind: Pod
        metadata:
          creationTimestamp: null
          name: kube-vip
          namespace: kube-system
        spec:
          containers:
          - args:
            - start
            env:
            - name: vip_arp
              value: "true"
            - name: vip_leaderelection
              value: "true"
            - name: vip_address
              value: {{ control_plane_endpoint }}
            - name: vip_interface
              value: {{ .DefaultNetworkInterfaceName }}
            - name: vip_leaseduration
              value: "15"
            - name: vip_renewdeadline
              value: "10"
            - name: vip_retryperiod
              value: "2"
            image: ghcr.io/kube-vip/kube-vip:v0.3.5
            imagePullPolicy: IfNotPresent
            name: kube-vip
            resources: {}
            securityContext:
              capabilities:
                add:
                - NET_ADMIN
                - SYS_TIME
            volumeMounts:
            - mountPath: /etc/kubernetes/admin.conf
              name: kubeconfig
          hostNetwork: true
          volumes:
          - hostPath:
              path: /etc/kubernetes/admin.conf
              type: FileOrCreate
            name: kubeconfig
        status: {}
      owner: root:root
      path: /etc/kubernetes/manifests/kube-vip.yaml
    initConfiguration:
      nodeRegistration:
        criSocket: /var/run/containerd/containerd.sock
        ignorePreflightErrors:
        - Swap
        - DirAvailable--etc-kubernetes-manifests
        - FileAvailable--etc-kubernetes-kubelet.conf
    joinConfiguration:
      nodeRegistration:
        criSocket: /var/run/containerd/containerd.sock
        ignorePreflightErrors:
        - Swap
        - DirAvailable--etc-kubernetes-manifests
        - FileAvailable--etc-kubernetes-kubelet.conf
  machineTemplate:
    infrastructureRef:
      apiVersion: infrastructure.cluster.x-k8s.io/v1beta1
      kind: ByoMachineTemplate
      name: byoh-cluster-control-plane
      namespace: default
  replicas: {{ controller_replicas }}
  version: {{ kubernetes_version }}
---
apiVersion: infrastructure.cluster.x-k8s.io/v1beta1
kind: ByoCluster
metadata:
  name: byoh-cluster
  namespace: default
spec:
  bundleLookupBaseRegistry: projects.registry.vmware.com/cluster_api_provider_bringyourownhost
  bundleLookupTag: 1.22.4
  controlPlaneEndpoint:
    host: {{ control_plane_endpoint }}
    port: 6443
---
apiVersion: infrastructure.cluster.x-k8s.io/v1beta1
kind: ByoMachineTemplate
metadata:
  name: byoh-cluster-md-0
  namespace: default
spec:
  template:
    spec: {}
---
apiVersion: infrastructure.cluster.x-k8s.io/v1beta1
kind: ByoMachineTemplate
metadata:
  name: byoh-cluster-control-plane
  namespace: default
spec:
  template:
    spec: {}
"#;
