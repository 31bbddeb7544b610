//! Process-wide, immutable watch lists the rule catalog matches against.
//!
//! Everything here is static data: known package paths, constructor and
//! method symbols, and the typed-client resource selector table. Rules never
//! mutate these; extending coverage means extending these tables, not rule
//! code.

use std::collections::HashSet;
use std::sync::LazyLock;

use kubeaudit_core::CallTarget;

/// Kubernetes package paths the catalog cares about.
pub mod paths {
    pub const CLIENT_GO_KUBERNETES: &str = "k8s.io/client-go/kubernetes";
    pub const CLIENT_GO_DYNAMIC: &str = "k8s.io/client-go/dynamic";
    pub const CLIENT_GO_REST: &str = "k8s.io/client-go/rest";
    pub const CLIENT_GO_DISCOVERY: &str = "k8s.io/client-go/discovery";
    pub const CLIENT_GO_DISCOVERY_CACHED: &str = "k8s.io/client-go/discovery/cached";
    pub const CLIENT_GO_RESTMAPPER: &str = "k8s.io/client-go/restmapper";
    pub const CLIENT_GO_INFORMERS: &str = "k8s.io/client-go/informers";
    pub const CLIENT_GO_TOOLS_CACHE: &str = "k8s.io/client-go/tools/cache";
    pub const CLIENT_GO_CLIENTCMD: &str = "k8s.io/client-go/tools/clientcmd";
    pub const CLIENT_GO_WORKQUEUE: &str = "k8s.io/client-go/util/workqueue";
    pub const CR_CLIENT: &str = "sigs.k8s.io/controller-runtime/pkg/client";
    pub const CR_CLIENT_CONFIG: &str = "sigs.k8s.io/controller-runtime/pkg/client/config";
    pub const CR_RECONCILE: &str = "sigs.k8s.io/controller-runtime/pkg/reconcile";
    pub const CR_CACHE: &str = "sigs.k8s.io/controller-runtime/pkg/cache";
    pub const CONTROLLER_RUNTIME: &str = "sigs.k8s.io/controller-runtime";
    pub const META_V1: &str = "k8s.io/apimachinery/pkg/apis/meta/v1";
    pub const UNSTRUCTURED: &str = "k8s.io/apimachinery/pkg/apis/meta/v1/unstructured";
    pub const RBAC_V1: &str = "k8s.io/api/rbac/v1";
    pub const RBAC_V1BETA1: &str = "k8s.io/api/rbac/v1beta1";
    pub const NET_HTTP: &str = "net/http";
    pub const TIME: &str = "time";
    pub const CONTEXT: &str = "context";
}

/// True for package paths that belong to the Kubernetes client ecosystem.
pub fn is_kubernetes_path(path: &str) -> bool {
    path.starts_with("k8s.io/")
        || path.starts_with("sigs.k8s.io/")
        || path.contains("client-go")
        || path.contains("controller-runtime")
        || path.contains("apimachinery")
}

/// A named, immutable set of qualified symbols with an explicit (often
/// narrower) bare-name fallback list.
///
/// Matching honors the resolution-tier contract: a precisely resolved symbol
/// is compared against the qualified entries only, so a same-named symbol
/// from an unrelated package never matches even when a rule accepts the
/// name-only fallback.
#[derive(Debug)]
pub struct SymbolSet {
    name: &'static str,
    entries: &'static [(&'static str, &'static str)],
    fallback_names: &'static [&'static str],
}

/// Which resolution tiers a rule accepts for a given match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionTier {
    /// Only import-resolved symbols match.
    Precise,
    /// Import-resolved symbols match; unresolved callees may match the
    /// fallback name list.
    PreciseOrName,
}

impl SymbolSet {
    pub const fn new(
        name: &'static str,
        entries: &'static [(&'static str, &'static str)],
        fallback_names: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            entries,
            fallback_names,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn contains(&self, package: &str, symbol: &str) -> bool {
        self.entries
            .iter()
            .any(|(p, n)| *p == package && *n == symbol)
    }

    pub fn contains_fallback_name(&self, symbol: &str) -> bool {
        self.fallback_names.contains(&symbol)
    }

    /// Match a resolved call target against this set under the given tier.
    pub fn matches(&self, target: &CallTarget, tier: ResolutionTier) -> bool {
        match target {
            CallTarget::Resolved(sym) => self.contains(&sym.package, &sym.name),
            CallTarget::Method { name } | CallTarget::Local(name) => {
                tier == ResolutionTier::PreciseOrName && self.contains_fallback_name(name)
            }
            CallTarget::Unresolved => false,
        }
    }
}

/// Client constructors whose per-call cost makes construction in loops or hot
/// paths a defect.
pub static CLIENT_CONSTRUCTORS: SymbolSet = SymbolSet::new(
    "client-constructors",
    &[
        (paths::CLIENT_GO_KUBERNETES, "NewForConfig"),
        (paths::CLIENT_GO_KUBERNETES, "NewForConfigOrDie"),
        (paths::CLIENT_GO_DYNAMIC, "NewForConfig"),
        (paths::CLIENT_GO_REST, "RESTClientFor"),
        (paths::CR_CLIENT, "New"),
    ],
    // "New" is far too generic for the name tier.
    &["NewForConfig", "NewForConfigOrDie", "RESTClientFor"],
);

/// rest.Config loaders; constructing these repeatedly re-reads kubeconfig or
/// service-account material.
pub static CONFIG_LOADERS: SymbolSet = SymbolSet::new(
    "config-loaders",
    &[
        (paths::CLIENT_GO_REST, "InClusterConfig"),
        (paths::CLIENT_GO_CLIENTCMD, "BuildConfigFromFlags"),
        (paths::CR_CLIENT_CONFIG, "GetConfig"),
        (paths::CR_CLIENT_CONFIG, "GetConfigOrDie"),
        (paths::CONTROLLER_RUNTIME, "GetConfig"),
        (paths::CONTROLLER_RUNTIME, "GetConfigOrDie"),
    ],
    &["InClusterConfig", "BuildConfigFromFlags"],
);

/// Shared informer constructors; their presence anywhere in a unit is the
/// mitigation the missing-informer rule looks for.
pub static INFORMER_CONSTRUCTORS: SymbolSet = SymbolSet::new(
    "informer-constructors",
    &[
        (paths::CLIENT_GO_INFORMERS, "NewSharedInformerFactory"),
        (paths::CLIENT_GO_INFORMERS, "NewSharedInformerFactoryWithOptions"),
        (paths::CLIENT_GO_TOOLS_CACHE, "NewSharedIndexInformer"),
        (paths::CLIENT_GO_TOOLS_CACHE, "NewSharedInformer"),
        (paths::CR_CACHE, "New"),
    ],
    &[
        "NewSharedInformerFactory",
        "NewSharedInformerFactoryWithOptions",
        "NewSharedIndexInformer",
        "NewSharedInformer",
    ],
);

/// Informer constructors that take a resync period argument.
pub static RESYNC_INFORMER_CONSTRUCTORS: SymbolSet = SymbolSet::new(
    "resync-informer-constructors",
    &[
        (paths::CLIENT_GO_TOOLS_CACHE, "NewSharedIndexInformer"),
        (paths::CLIENT_GO_TOOLS_CACHE, "NewSharedInformer"),
    ],
    &["NewSharedIndexInformer", "NewSharedInformer"],
);

/// Discovery/RESTMapper setup calls that flood the API server when repeated.
pub static DISCOVERY_SETUP: SymbolSet = SymbolSet::new(
    "discovery-setup",
    &[
        (paths::CLIENT_GO_DISCOVERY, "NewDiscoveryClientForConfig"),
        (paths::CLIENT_GO_RESTMAPPER, "NewDeferredDiscoveryRESTMapper"),
        (paths::CLIENT_GO_RESTMAPPER, "NewDiscoveryRESTMapper"),
        (paths::CLIENT_GO_RESTMAPPER, "ResetRESTMapper"),
    ],
    &[],
);

/// RESTMapper constructors that should be wrapped in a cache.
pub static RESTMAPPER_CONSTRUCTORS: SymbolSet = SymbolSet::new(
    "restmapper-constructors",
    &[
        (paths::CLIENT_GO_RESTMAPPER, "NewDeferredDiscoveryRESTMapper"),
        (paths::CLIENT_GO_RESTMAPPER, "NewDiscoveryRESTMapper"),
    ],
    &[],
);

/// Caching wrappers that mitigate RESTMapper rebuild cost.
pub static RESTMAPPER_CACHING: SymbolSet = SymbolSet::new(
    "restmapper-caching",
    &[
        (paths::CLIENT_GO_RESTMAPPER, "NewShortcutExpander"),
        (paths::CLIENT_GO_DISCOVERY_CACHED, "NewCachedDiscoveryClient"),
    ],
    &[],
);

/// Workqueue constructors without rate limiting.
pub static UNBOUNDED_WORKQUEUE: SymbolSet = SymbolSet::new(
    "unbounded-workqueue",
    &[
        (paths::CLIENT_GO_WORKQUEUE, "New"),
        (paths::CLIENT_GO_WORKQUEUE, "NewNamed"),
    ],
    &[],
);

/// Typed clientset constructors (the typed alternative to dynamic clients).
pub static TYPED_CLIENT_CONSTRUCTORS: SymbolSet = SymbolSet::new(
    "typed-client-constructors",
    &[
        (paths::CLIENT_GO_KUBERNETES, "NewForConfig"),
        (paths::CLIENT_GO_KUBERNETES, "NewForConfigOrDie"),
    ],
    &[],
);

/// Dynamic client constructors.
pub static DYNAMIC_CLIENT_CONSTRUCTORS: SymbolSet = SymbolSet::new(
    "dynamic-client-constructors",
    &[
        (paths::CLIENT_GO_DYNAMIC, "NewForConfig"),
        (paths::CLIENT_GO_DYNAMIC, "NewForConfigOrDie"),
        (paths::CLIENT_GO_DYNAMIC, "NewDynamicClientForConfig"),
    ],
    &[],
);

/// API verbs that hit the API server.
pub const API_VERBS: &[&str] = &[
    "Get", "List", "Create", "Update", "Patch", "Delete", "Watch",
];

/// Method names that stop or cancel a watch.
pub const STOP_NAMES: &[&str] = &["Stop", "StopWatching", "Cancel"];

/// Call names that indicate a backoff/retry mitigation in an error branch.
pub const BACKOFF_NAMES: &[&str] = &["Sleep", "Backoff", "Wait", "Retry"];

/// Identifiers that mark a condition as checking for a transient error.
pub const TRANSIENT_ERROR_IDENTS: &[&str] = &[
    "Timeout",
    "Temporary",
    "NetError",
    "TooManyRequests",
    "ServerTimeout",
    "ConnectionRefused",
];

/// Thresholds shared by the missing-protective-field family.
pub const LARGE_PAGE_LIMIT: i64 = 1000;
pub const MAX_REASONABLE_QPS: f64 = 10_000.0;
pub const MAX_REASONABLE_BURST: i64 = 100_000;
/// Unit-level count of unstructured constructs that triggers K8S052.
pub const UNSTRUCTURED_OVERUSE_THRESHOLD: usize = 3;

/// True if `name` is a known typed-client resource selector (`Pods`,
/// `Deployments`, CRD kinds, ...). Used by the chain walker to recognize
/// namespace-scoped API shapes without full type resolution.
pub fn is_resource_selector(name: &str) -> bool {
    RESOURCE_SELECTOR_SET.contains(name)
}

static RESOURCE_SELECTOR_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| RESOURCE_SELECTORS.iter().copied().collect());

/// Common typed-client resource selector names across core, apps, batch and
/// the CRD ecosystem (extend as needed).
pub static RESOURCE_SELECTORS: &[&str] = &[
    "Pods",
    "Deployments",
    "Services",
    "StatefulSets",
    "ConfigMaps",
    "Secrets",
    "Nodes",
    "Namespaces",
    "Events",
    "Jobs",
    "CronJobs",
    "PersistentVolumes",
    "PersistentVolumeClaims",
    "DaemonSets",
    "ReplicaSets",
    "ACRAccessToken",
    "AddonInstance",
    "AddonOperator",
    "Addon",
    "AdminNetworkPolicy",
    "AdminPolicyBasedExternalRoute",
    "AdmissionCheck",
    "AlertingRule",
    "AlertmanagerConfig",
    "Alertmanager",
    "AlertRelabelConfig",
    "AnalysisRun",
    "AnalysisTemplate",
    "APIRequestCount",
    "APIServer",
    "ApiServerSource",
    "Application",
    "ApplicationSet",
    "AppProject",
    "ArgoCD",
    "ArtifactBuild",
    "AuthCode",
    "Authentication",
    "AuthRequest",
    "Backstage",
    "BackupRepository",
    "Backup",
    "BackupStorageLocation",
    "BareMetalHost",
    "BaselineAdminNetworkPolicy",
    "BMCEventSubscription",
    "Broker",
    "BuildPipelineSelector",
    "Build",
    "CatalogSource",
    "CertificateRequest",
    "Certificate",
    "CertManager",
    "Challenge",
    "Channel",
    "CleanupPolicy",
    "CloudCredential",
    "CloudPrivateIPConfig",
    "CloudStorage",
    "ClusterAnalysisTemplate",
    "ClusterAutoscaler",
    "ClusterCleanupPolicy",
    "ClusterCSIDriver",
    "ClusterEphemeralReport",
    "ClusterExternalSecret",
    "ClusterGenerator",
    "ClusterInterceptor",
    "ClusterIssuer",
    "ClusterKubeArchiveConfig",
    "ClusterLogForwarder",
    "ClusterLogging",
    "ClusterObjectDeployment",
    "ClusterObjectSetPhase",
    "ClusterObjectSet",
    "ClusterObjectSlice",
    "ClusterObjectTemplate",
    "ClusterOperator",
    "ClusterPackage",
    "ClusterPolicy",
    "ClusterPolicyReport",
    "ClusterQueue",
    "ClusterRegistrar",
    "ClusterResourceQuota",
    "ClusterSecretStore",
    "ClusterServiceVersion",
    "ClusterTask",
    "ClusterTriggerBinding",
    "ClusterUrlMonitor",
    "ClusterVacuumConfig",
    "ClusterVersion",
    "ComponentDetectionQuery",
    "Component",
    "CompositeResourceDefinition",
    "CompositionRevision",
    "Composition",
    "Config",
    "ConfigurationRevision",
    "Configuration",
    "Connector",
    "ConsoleCLIDownload",
    "ConsoleExternalLogLink",
    "ConsoleLink",
    "ConsoleNotification",
    "ConsolePlugin",
    "ConsoleQuickStart",
    "Console",
    "ConsoleSample",
    "ConsoleYAMLSample",
    "ContainerRuntimeConfig",
    "ContainerSource",
    "ControllerConfig",
    "ControlPlaneMachineSet",
    "CostManagementMetricsConfig",
    "CredentialsRequest",
    "CSISnapshotController",
    "CustomDomain",
    "CustomRun",
    "DataDownload",
    "DataImage",
    "DataProtectionApplication",
    "DataUpload",
    "DeleteBackupRequest",
    "DependencyBuild",
    "DependencyUpdateCheck",
    "DeploymentRuntimeConfig",
    "DeploymentTargetClaim",
    "DeploymentTargetClass",
    "DeploymentTarget",
    "DeviceRequest",
    "DeviceToken",
    "DNS",
    "DNSRecord",
    "DownloadRequest",
    "ECRAuthorizationToken",
    "EgressFirewall",
    "EgressIP",
    "EgressQoS",
    "EgressRouter",
    "EgressService",
    "EnterpriseContractPolicy",
    "EnvironmentConfig",
    "Environment",
    "EphemeralReport",
    "Etcd",
    "EventListener",
    "EventPolicy",
    "EventType",
    "Experiment",
    "ExternalSecret",
    "Fake",
    "FeatureGate",
    "FirmwareSchema",
    "FunctionRevision",
    "Function",
    "GCRAccessToken",
    "GithubAccessToken",
    "GitOpsDeploymentManagedEnvironment",
    "GitOpsDeploymentRepositoryCredential",
    "GitOpsDeployment",
    "GitOpsDeploymentSyncRun",
    "GitopsService",
    "GlobalContextEntry",
    "GoTemplate",
    "GrafanaAlertRuleGroup",
    "GrafanaContactPoint",
    "GrafanaDashboard",
    "GrafanaDatasource",
    "GrafanaDataSource",
    "GrafanaFolder",
    "GrafanaLibraryPanel",
    "GrafanaMuteTiming",
    "GrafanaNotificationChannel",
    "GrafanaNotificationPolicy",
    "GrafanaNotificationPolicyRoute",
    "GrafanaNotificationTemplate",
    "Grafana",
    "GroupSync",
    "HardwareData",
    "HelmChartRepository",
    "HostFirmwareComponents",
    "HostFirmwareSettings",
    "HubConfig",
    "Idler",
    "ImageConfig",
    "ImageContentPolicy",
    "ImageContentSourcePolicy",
    "ImageDigestMirrorSet",
    "ImagePruner",
    "ImageRepository",
    "Image",
    "ImageTagMirrorSet",
    "Infrastructure",
    "IngressController",
    "Ingress",
    "InMemoryChannel",
    "InsightsOperator",
    "InstallPlan",
    "IntegrationTestScenario",
    "Interceptor",
    "InternalRequest",
    "InternalServicesConfig",
    "IPAddressClaim",
    "IPAddress",
    "IPPool",
    "Issuer",
    "IstioCSR",
    "JBSConfig",
    "JobSink",
    "JvmImageScan",
    "KeplerInternal",
    "Kepler",
    "KubeAPIServer",
    "KubeArchiveConfig",
    "KubeControllerManager",
    "KubeletConfig",
    "KubeScheduler",
    "KubeStorageVersionMigrator",
    "Kueue",
    "LocalQueue",
    "Lock",
    "LogFileMetricExporter",
    "MachineAutoscaler",
    "MachineConfigNode",
    "MachineConfigPool",
    "MachineConfig",
    "MachineConfiguration",
    "MachineHealthCheck",
    "Machine",
    "MachineSet",
    "ManagedFleetNotificationRecord",
    "ManagedFleetNotification",
    "ManagedNotification",
    "ManualApprovalGate",
    "MemberOperatorConfig",
    "MemberStatus",
    "MonitoringStack",
    "MultiKueueCluster",
    "MultiKueueConfig",
    "MustGather",
    "Namespace",
    "NamespaceVacuumConfig",
    "NetworkAttachmentDefinition",
    "Network",
    "Node",
    "NSTemplateSet",
    "OAuth",
    "ObjectDeployment",
    "Object",
    "ObjectSetPhase",
    "ObjectSet",
    "ObjectSlice",
    "ObjectTemplate",
    "ObservedObjectCollection",
    "OcmAgent",
    "OfflineSessions",
    "OLMConfig",
    "OpenShiftAPIServer",
    "OpenShiftControllerManager",
    "OpenShiftPipelinesAsCode",
    "Operation",
    "OperatorCondition",
    "OperatorConfig",
    "OperatorGroup",
    "OperatorHub",
    "OperatorPKI",
    "Operator",
    "Order",
    "OverlappingRangeIPReservation",
    "Package",
    "Parallel",
    "Password",
    "PerformanceProfile",
    "Perses",
    "PersesDashboard",
    "PersesDatasource",
    "PingSource",
    "PipelineRun",
    "Pipeline",
    "PodMonitor",
    "PodNetworkConnectivityCheck",
    "PodVolumeBackup",
    "PodVolumeRestore",
    "Policy",
    "PolicyException",
    "PolicyReport",
    "PreprovisioningImage",
    "Probe",
    "Profile",
    "ProjectDevelopmentStream",
    "ProjectDevelopmentStreamTemplate",
    "ProjectHelmChartRepository",
    "Project",
    "PrometheusAgent",
    "Prometheus",
    "PrometheusRule",
    "PromotionRun",
    "ProviderConfig",
    "ProviderConfigUsage",
    "ProviderRevision",
    "Provider",
    "ProvisioningRequestConfig",
    "Provisioning",
    "Proxy",
    "PulpAccessRequest",
    "PushSecret",
    "RangeAllocation",
    "RebuiltArtifact",
    "RefreshToken",
    "RegisteredCluster",
    "ReleasePlanAdmission",
    "ReleasePlan",
    "Release",
    "ReleaseServiceConfig",
    "ReleaseStrategy",
    "RemoteSecret",
    "Repository",
    "ResolutionRequest",
    "ResourceFlavor",
    "Resources",
    "ResticRepository",
    "Restore",
    "RoleBindingRestriction",
    "RolloutManager",
    "Rollout",
    "RouteMonitor",
    "Scheduler",
    "Schedule",
    "ScrapeConfig",
    "SecretStore",
    "SecurityContextConstraints",
    "Sequence",
    "ServerStatusRequest",
    "ServiceCA",
    "ServiceMonitor",
    "SharedConfigMap",
    "SharedSecret",
    "SigningKey",
    "SinkBinding",
    "SinkFilter",
    "SnapshotEnvironmentBinding",
    "Snapshot",
    "SpaceBindingRequest",
    "SpaceRequest",
    "SPIAccessCheck",
    "SPIAccessTokenBinding",
    "SPIAccessTokenDataUpdate",
    "SPIAccessToken",
    "SPIFileContentRequest",
    "SplunkForwarder",
    "StepAction",
    "Storage",
    "StorageState",
    "StorageVersionMigration",
    "StoreConfig",
    "STSSessionToken",
    "SubjectPermission",
    "Subscription",
    "SystemConfig",
    "TaskRun",
    "Task",
    "TektonAddon",
    "TektonChain",
    "TektonConfig",
    "TektonHub",
    "TektonInstallerSet",
    "TektonPipeline",
    "TektonPruner",
    "TektonResult",
    "TektonTrigger",
    "TestPlatformCluster",
    "ThanosQuerier",
    "ThanosRuler",
    "ToolchainCluster",
    "TriggerBinding",
    "Trigger",
    "TriggerTemplate",
    "Tuned",
    "UIPlugin",
    "UpdateRequest",
    "UpgradeConfig",
    "Usage",
    "UserAccount",
    "UUID",
    "VaultDynamicSecret",
    "VeleroInstall",
    "VerificationPolicy",
    "VolumeSnapshotBackup",
    "VolumeSnapshotClass",
    "VolumeSnapshotContent",
    "VolumeSnapshotLocation",
    "VolumeSnapshotRestore",
    "VolumeSnapshot",
    "Webhook",
    "WorkloadPriorityClass",
    "Workload",
    "Workspace",
    "XNamespace",
    "XTestPlatformCluster",
];

#[cfg(test)]
mod tests {
    use super::*;
    use kubeaudit_core::QualifiedSymbol;

    fn resolved(package: &str, name: &str) -> CallTarget {
        CallTarget::Resolved(QualifiedSymbol {
            package: package.to_string(),
            name: name.to_string(),
        })
    }

    #[test]
    fn kubernetes_path_predicate() {
        assert!(is_kubernetes_path("k8s.io/client-go/kubernetes"));
        assert!(is_kubernetes_path("sigs.k8s.io/controller-runtime/pkg/client"));
        assert!(is_kubernetes_path("example.com/fork/client-go/rest"));
        assert!(!is_kubernetes_path("net/http"));
        assert!(!is_kubernetes_path("github.com/acme/widgets"));
    }

    #[test]
    fn precise_match_requires_declaring_package() {
        assert!(CLIENT_CONSTRUCTORS.matches(
            &resolved(paths::CLIENT_GO_KUBERNETES, "NewForConfig"),
            ResolutionTier::Precise,
        ));
        // Same name, unrelated declaring scope: never a match.
        assert!(!CLIENT_CONSTRUCTORS.matches(
            &resolved("github.com/acme/fake", "NewForConfig"),
            ResolutionTier::PreciseOrName,
        ));
    }

    #[test]
    fn name_tier_only_when_declared() {
        let method = CallTarget::Method {
            name: "NewForConfig".to_string(),
        };
        assert!(CLIENT_CONSTRUCTORS.matches(&method, ResolutionTier::PreciseOrName));
        assert!(!CLIENT_CONSTRUCTORS.matches(&method, ResolutionTier::Precise));
    }

    #[test]
    fn generic_new_is_not_a_fallback_name() {
        let method = CallTarget::Method {
            name: "New".to_string(),
        };
        assert!(!CLIENT_CONSTRUCTORS.matches(&method, ResolutionTier::PreciseOrName));
        // But precisely resolved controller-runtime client.New matches.
        assert!(CLIENT_CONSTRUCTORS.matches(
            &resolved(paths::CR_CLIENT, "New"),
            ResolutionTier::Precise,
        ));
    }

    #[test]
    fn unresolved_never_matches() {
        assert!(!CLIENT_CONSTRUCTORS.matches(&CallTarget::Unresolved, ResolutionTier::PreciseOrName));
    }

    #[test]
    fn resource_selector_table() {
        assert!(is_resource_selector("Pods"));
        assert!(is_resource_selector("ClusterPolicy"));
        assert!(is_resource_selector("PipelineRun"));
        assert!(!is_resource_selector("Widgets"));
        assert!(RESOURCE_SELECTORS.len() > 350, "expected the full table");
    }

    #[test]
    fn workqueue_set_is_precise_only() {
        let local = CallTarget::Local("New".to_string());
        assert!(!UNBOUNDED_WORKQUEUE.matches(&local, ResolutionTier::PreciseOrName));
        assert!(UNBOUNDED_WORKQUEUE.matches(
            &resolved(paths::CLIENT_GO_WORKQUEUE, "New"),
            ResolutionTier::Precise,
        ));
    }
}
