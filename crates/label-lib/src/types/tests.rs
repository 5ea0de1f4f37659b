//! Catalog-wide tests: populated fixtures, validation rules and wire form

use super::*;
use crate::validation::Rule;
use std::collections::HashMap;

fn basic_qa() -> BasicQaLabel {
    let mut label = BasicQaLabel::new("Why is my pod stuck in Pending?");
    label.answer = "No node has enough free memory to satisfy the 4Gi request.".to_string();
    label.context = Context {
        pod_name: "checkout-6f7c9d-x2k4p".to_string(),
        namespace: "shop".to_string(),
        events: vec!["0/3 nodes are available: 3 Insufficient memory.".to_string()],
        cluster: "prod-eu-1".to_string(),
        additional: HashMap::from([(
            "node_pool".to_string(),
            serde_json::json!({ "name": "general", "size": 3 }),
        )]),
        ..Default::default()
    };
    label
}

fn troubleshooting() -> TroubleshootingLabel {
    let mut label = TroubleshootingLabel::new("Why does the api pod keep restarting?");
    label.analysis = TroubleshootingAnalysis {
        symptoms: vec![
            "CrashLoopBackOff".to_string(),
            "restart count 14 in 1h".to_string(),
        ],
        root_cause: "Liveness probe times out during JVM warmup".to_string(),
        evidence: TroubleshootingEvidence {
            metrics: HashMap::from([("restarts_1h".to_string(), "14".to_string())]),
            logs: vec!["Liveness probe failed: context deadline exceeded".to_string()],
            events: vec![],
        },
        resolution: Resolution {
            root_cause: "initialDelaySeconds too short".to_string(),
            steps: vec!["Add a startupProbe".to_string()],
            fix: String::new(),
            verification: "No restarts over 24h".to_string(),
        },
    };
    label.metadata = Context {
        namespace: "platform".to_string(),
        service: "api".to_string(),
        ..Default::default()
    };
    label
}

fn resource() -> ResourceLabel {
    let mut label = ResourceLabel::new("Is the worker deployment over-provisioned?");
    label.scenario = "Batch workers idle most of the day".to_string();
    label.current_state = ResourceState {
        resources: ResourceMetrics {
            cpu: ResourceMetric {
                usage: "120m".to_string(),
                limit: "2".to_string(),
                request: "1".to_string(),
                throttling: "0%".to_string(),
                utilization: "12%".to_string(),
            },
            memory: ResourceMetric {
                usage: "300Mi".to_string(),
                limit: "2Gi".to_string(),
                request: "1Gi".to_string(),
                ..Default::default()
            },
        },
        metrics: ResourceUsage {
            cpu_usage_p95: "250m".to_string(),
            memory_usage_p95: "410Mi".to_string(),
            cpu_throttling: "0%".to_string(),
            oom_events: "0".to_string(),
        },
    };
    label.analysis = ResourceAnalysis {
        findings: vec!["p95 CPU is a quarter of the request".to_string()],
        recommendation: "Lower CPU request to 300m and memory request to 512Mi".to_string(),
        predicted_impact: ResourceImpact {
            cost_savings: "38%".to_string(),
            performance: "No measurable change".to_string(),
            risk: "Low".to_string(),
        },
    };
    label
}

fn deployment() -> DeploymentLabel {
    let mut label = DeploymentLabel::new("Why did the rollout stall?");
    label.deployment_context = DeploymentContext {
        service: "payments".to_string(),
        old_version: "v1.8.2".to_string(),
        new_version: "v1.9.0".to_string(),
        rollout_strategy: "RollingUpdate".to_string(),
    };
    label.analysis = DeploymentAnalysis {
        status: DeploymentStatus {
            desired_replicas: 4,
            updated_replicas: 1,
            available_replicas: 3,
            unavailable_replicas: 1,
        },
        events: vec![Event::new(
            "Warning",
            "Unhealthy",
            "Readiness probe failed: HTTP probe failed with statuscode: 503",
        )],
        pod_conditions: vec![PodCondition {
            condition_type: "Ready".to_string(),
            status: "False".to_string(),
            reason: "ContainersNotReady".to_string(),
            message: "containers with unready status: [payments]".to_string(),
        }],
        logs: vec!["missing env PAYMENTS_DB_URL".to_string()],
    };
    label.resolution = Resolution {
        root_cause: "New version requires a secret that was not created".to_string(),
        steps: vec!["Create the secret".to_string(), "Restart rollout".to_string()],
        fix: "kubectl create secret generic payments-db ...".to_string(),
        verification: "kubectl rollout status reports success".to_string(),
    };
    label
}

fn network() -> NetworkLabel {
    let mut label = NetworkLabel::new("Why can't frontend reach the orders service?");
    label.network_context = NetworkContext {
        source: ServiceEndpoint {
            service: "frontend".to_string(),
            namespace: "web".to_string(),
            labels: HashMap::from([("app".to_string(), "frontend".to_string())]),
        },
        destination: ServiceEndpoint {
            service: "orders".to_string(),
            namespace: "backend".to_string(),
            labels: HashMap::from([("app".to_string(), "orders".to_string())]),
        },
    };
    label.analysis = NetworkAnalysis {
        connectivity_test: ConnectivityTest {
            protocol: "tcp".to_string(),
            port: 8080,
            result: "timeout".to_string(),
        },
        network_policies: vec![NetworkPolicy {
            name: "orders-ingress".to_string(),
            namespace: "backend".to_string(),
            spec: NetworkPolicySpec {
                ingress: vec![NetworkPolicyRule {
                    from: vec![NetworkPolicyPeer {
                        namespace_selector: LabelSelector {
                            match_labels: HashMap::from([(
                                "team".to_string(),
                                "backend".to_string(),
                            )]),
                        },
                        pod_selector: LabelSelector::default(),
                    }],
                }],
            },
        }],
        diagnosis: "Ingress only admits the backend namespace".to_string(),
        solution: "Add a peer selecting the web namespace".to_string(),
    };
    label
}

fn service_mesh() -> ServiceMeshLabel {
    let mut label = ServiceMeshLabel::new("Why are cart -> inventory calls failing?");
    label.mesh_context = MeshContext {
        source_service: "cart".to_string(),
        destination_service: "inventory".to_string(),
        mesh_platform: "Istio".to_string(),
        observed_period: "15m".to_string(),
    };
    label.telemetry = Telemetry {
        metrics: MeshMetrics {
            error_rate: "4.2%".to_string(),
            latency_p95: "870ms".to_string(),
            requests_per_second: "310".to_string(),
        },
        traces: vec![Trace {
            trace_id: "4bf92f3577b34da6a3ce929d0e0e4736".to_string(),
            spans: vec![
                Span {
                    service: "cart".to_string(),
                    operation: "GET /cart".to_string(),
                    duration: "880ms".to_string(),
                    status: "ok".to_string(),
                    error: String::new(),
                },
                Span {
                    service: "inventory".to_string(),
                    operation: "CheckStock".to_string(),
                    duration: "850ms".to_string(),
                    status: "error".to_string(),
                    error: "upstream connect error: connection timeout".to_string(),
                },
            ],
        }],
    };
    label.analysis = MeshAnalysis {
        root_cause: "Inventory connection pool exhausted".to_string(),
        evidence: "Envoy reports upstream_cx_overflow".to_string(),
        solution: "Raise DestinationRule maxConnections".to_string(),
    };
    label
}

fn multi_cluster() -> MultiClusterLabel {
    let mut label = MultiClusterLabel::new("Why doesn't us-east resolve the eu service?");
    label.cluster_context = ClusterContext {
        clusters: vec![
            Cluster {
                name: "eu-west".to_string(),
                region: "europe-west1".to_string(),
                status: "Ready".to_string(),
            },
            Cluster {
                name: "us-east".to_string(),
                region: "us-east1".to_string(),
                status: "Ready".to_string(),
            },
        ],
        federation_type: "kubefed".to_string(),
        service_discovery: "dns".to_string(),
    };
    label.analysis = ClusterAnalysis {
        symptoms: vec!["NXDOMAIN for orders.backend.svc.clusterset.local".to_string()],
        diagnostics: ClusterDiagnostics {
            dns_checks: vec![DnsCheck {
                query: "orders.backend.svc.clusterset.local".to_string(),
                status: "NXDOMAIN".to_string(),
                expected: "10.8.0.12".to_string(),
            }],
            federation_status: FederationStatus {
                controller: "Running".to_string(),
                sync_status: "Failed".to_string(),
                error: "FederatedService orders: cluster us-east not joined".to_string(),
            },
        },
        root_cause: "us-east was never joined to the federation".to_string(),
        resolution: "kubefedctl join us-east".to_string(),
    };
    label
}

fn all_populated() -> Vec<AnyLabel> {
    vec![
        basic_qa().into(),
        troubleshooting().into(),
        resource().into(),
        deployment().into(),
        network().into(),
        service_mesh().into(),
        multi_cluster().into(),
    ]
}

fn rule_of<'a>(err: &'a crate::validation::ValidationError, field: &str) -> &'a Rule {
    &err.violation(field)
        .unwrap_or_else(|| panic!("no violation for {field}: {err}"))
        .rule
}

mod catalog_tests {
    use super::*;

    #[test]
    fn test_label_type_tags() {
        let tags: Vec<&str> = LabelType::ALL.iter().map(|t| t.as_str()).collect();
        assert_eq!(
            tags,
            vec![
                "basic_qa",
                "troubleshooting",
                "resource",
                "deployment",
                "network",
                "service_mesh",
                "multi_cluster"
            ]
        );

        for t in LabelType::ALL {
            assert_eq!(t.as_str().parse::<LabelType>().unwrap(), t);
            assert_eq!(serde_json::to_value(t).unwrap(), t.as_str());
        }
    }

    #[test]
    fn test_unknown_tag_fails_to_parse() {
        let err = "storage".parse::<LabelType>().unwrap_err();
        assert!(matches!(err, crate::LabelError::UnknownType(t) if t == "storage"));
    }

    #[test]
    fn test_populated_labels_are_valid() {
        for label in all_populated() {
            if let Err(e) = label.validate() {
                panic!("{} fixture should be valid: {}", label.label_type(), e);
            }
        }
    }

    #[test]
    fn test_labels_through_trait_objects() {
        let labels = all_populated();
        let dyn_labels: Vec<&dyn Label> = labels.iter().map(|l| l.as_label()).collect();

        for (label, t) in dyn_labels.iter().zip(LabelType::ALL) {
            assert_eq!(label.label_type(), t);
            assert!(label.id().starts_with(&format!("{}-", t)));
            assert!(!label.question().is_empty());
            assert!(label.validate().is_ok());
        }
    }

    #[test]
    fn test_direct_construction_sets_identity() {
        let label = DeploymentLabel::new("why did rollout stall?");
        assert_eq!(label.label_type(), LabelType::Deployment);
        assert_eq!(
            label.id(),
            format!("deployment-{}", label.timestamp().timestamp())
        );
        assert_eq!(label.question(), "why did rollout stall?");
    }
}

mod validation_tests {
    use super::*;

    #[test]
    fn test_empty_labels_fail_validation() {
        let expected = [
            (AnyLabel::from(BasicQaLabel::new("q")), "answer"),
            (TroubleshootingLabel::new("q").into(), "analysis.root_cause"),
            (ResourceLabel::new("q").into(), "scenario"),
            (DeploymentLabel::new("q").into(), "deployment_context.service"),
            (NetworkLabel::new("q").into(), "network_context.source.service"),
            (ServiceMeshLabel::new("q").into(), "mesh_context.source_service"),
            (MultiClusterLabel::new("q").into(), "cluster_context.federation_type"),
        ];

        for (label, field) in expected {
            let err = label.validate().unwrap_err();
            assert_eq!(err.label_type, label.label_type());
            assert_eq!(err.label_id, label.id());
            assert_eq!(rule_of(&err, field), &Rule::Required);
        }
    }

    #[test]
    fn test_blank_question_is_invalid() {
        let mut label = basic_qa();
        label.base = BaseLabel::new(LabelType::BasicQa, "  ");

        let err = label.validate().unwrap_err();
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["question"]);
    }

    #[test]
    fn test_foreign_id_prefix_is_malformed() {
        let mut label = network();
        label.base = BaseLabel::new(LabelType::Deployment, "q");

        let err = label.validate().unwrap_err();
        assert!(matches!(rule_of(&err, "id"), Rule::Malformed { .. }));
    }

    #[test]
    fn test_basic_qa_requires_scoped_context() {
        let mut label = basic_qa();
        label.context = Context {
            version: "1.29".to_string(),
            ..Default::default()
        };

        let err = label.validate().unwrap_err();
        assert!(matches!(rule_of(&err, "context"), Rule::Inconsistent { .. }));
    }

    #[test]
    fn test_troubleshooting_needs_evidence_and_remediation() {
        let mut label = troubleshooting();
        label.analysis.evidence = TroubleshootingEvidence::default();
        label.analysis.resolution.steps.clear();

        let err = label.validate().unwrap_err();
        assert!(err.has_violation("analysis.evidence"));
        assert!(err.has_violation("analysis.resolution"));
        assert_eq!(err.violations.len(), 2);
    }

    #[test]
    fn test_resource_request_above_limit() {
        let mut label = resource();
        label.current_state.resources.memory.request = "4Gi".to_string();

        let err = label.validate().unwrap_err();
        assert!(matches!(
            rule_of(&err, "current_state.resources.memory.request"),
            Rule::Inconsistent { reason } if reason.contains("exceeds limit 2Gi")
        ));
    }

    #[test]
    fn test_resource_bad_quantity_and_risk() {
        let mut label = resource();
        label.current_state.resources.cpu.limit = "two cores".to_string();
        label.current_state.resources.cpu.utilization = "high".to_string();
        label.analysis.predicted_impact.risk = "negligible".to_string();

        let err = label.validate().unwrap_err();
        assert!(matches!(
            rule_of(&err, "current_state.resources.cpu.limit"),
            Rule::Malformed { .. }
        ));
        assert!(err.has_violation("current_state.resources.cpu.utilization"));
        assert!(matches!(
            rule_of(&err, "analysis.predicted_impact.risk"),
            Rule::NotAllowed { value, .. } if value == "negligible"
        ));
        assert!(!err.has_violation("current_state.resources.cpu.request"));
    }

    #[test]
    fn test_deployment_unavailable_exceeds_desired() {
        let mut label = deployment();
        label.analysis.status.unavailable_replicas = 5;

        let err = label.validate().unwrap_err();
        assert_eq!(
            err.fields().collect::<Vec<_>>(),
            vec!["analysis.status.unavailable_replicas"]
        );
    }

    #[test]
    fn test_deployment_same_version_and_bad_strategy() {
        let mut label = deployment();
        label.deployment_context.new_version = "v1.8.2".to_string();
        label.deployment_context.rollout_strategy = "Rolling".to_string();
        label.analysis.pod_conditions[0].status = "maybe".to_string();
        label.analysis.events[0].event_type = "Error".to_string();

        let err = label.validate().unwrap_err();
        assert!(matches!(
            rule_of(&err, "deployment_context.new_version"),
            Rule::Inconsistent { .. }
        ));
        assert!(matches!(
            rule_of(&err, "deployment_context.rollout_strategy"),
            Rule::NotAllowed { .. }
        ));
        assert!(err.has_violation("analysis.pod_conditions[0].status"));
        assert!(err.has_violation("analysis.events[0].type"));
    }

    #[test]
    fn test_network_protocol_and_port() {
        let mut label = network();
        label.analysis.connectivity_test.protocol = "QUIC".to_string();
        label.analysis.connectivity_test.port = 70000;

        let err = label.validate().unwrap_err();
        assert!(matches!(
            rule_of(&err, "analysis.connectivity_test.protocol"),
            Rule::NotAllowed { .. }
        ));
        assert_eq!(
            rule_of(&err, "analysis.connectivity_test.port"),
            &Rule::OutOfRange {
                value: 70000,
                min: 1,
                max: 65535
            }
        );
    }

    #[test]
    fn test_network_peer_selecting_everything() {
        let mut label = network();
        label.analysis.network_policies[0].spec.ingress[0]
            .from
            .push(NetworkPolicyPeer::default());

        let err = label.validate().unwrap_err();
        assert_eq!(
            err.fields().collect::<Vec<_>>(),
            vec!["analysis.network_policies[0].spec.ingress[0].from[1]"]
        );
        assert!(matches!(
            rule_of(&err, "analysis.network_policies[0].spec.ingress[0].from[1]"),
            Rule::Inconsistent { .. }
        ));
    }

    #[test]
    fn test_network_negative_port() {
        let mut label = network();
        label.analysis.connectivity_test.port = -443;

        let err = label.validate().unwrap_err();
        assert_eq!(
            rule_of(&err, "analysis.connectivity_test.port"),
            &Rule::OutOfRange {
                value: -443,
                min: 1,
                max: 65535
            }
        );
    }

    #[test]
    fn test_deployment_negative_replicas() {
        let mut label = deployment();
        label.analysis.status.available_replicas = -1;

        let err = label.validate().unwrap_err();
        assert_eq!(
            rule_of(&err, "analysis.status.available_replicas"),
            &Rule::OutOfRange {
                value: -1,
                min: 0,
                max: i64::from(i32::MAX)
            }
        );
        assert!(!err.has_violation("analysis.status.unavailable_replicas"));
    }

    #[test]
    fn test_network_icmp_has_no_port() {
        let mut label = network();
        label.analysis.connectivity_test.protocol = "ICMP".to_string();
        label.analysis.connectivity_test.port = 0;
        assert!(label.validate().is_ok());

        label.analysis.connectivity_test.protocol = "TCP".to_string();
        assert!(label.validate().is_err());
    }

    #[test]
    fn test_service_mesh_span_consistency() {
        let mut label = service_mesh();
        label.telemetry.traces[0].spans[0].error = "reset by peer".to_string();
        label.telemetry.traces[0].spans[1].error.clear();
        label.telemetry.metrics.error_rate = "140%".to_string();

        let err = label.validate().unwrap_err();
        assert!(err.has_violation("telemetry.traces[0].spans[0].error"));
        assert!(err.has_violation("telemetry.traces[0].spans[1].error"));
        assert!(matches!(
            rule_of(&err, "telemetry.metrics.error_rate"),
            Rule::Malformed { .. }
        ));
    }

    #[test]
    fn test_service_mesh_trace_without_spans() {
        let mut label = service_mesh();
        label.telemetry.traces.push(Trace {
            trace_id: "abc".to_string(),
            spans: vec![],
        });
        label.mesh_context.mesh_platform = "nginx".to_string();

        let err = label.validate().unwrap_err();
        assert_eq!(rule_of(&err, "telemetry.traces[1].spans"), &Rule::Empty);
        assert!(err.has_violation("mesh_context.mesh_platform"));
    }

    #[test]
    fn test_multi_cluster_rules() {
        let mut label = multi_cluster();
        label.cluster_context.clusters[1].name = "eu-west".to_string();
        label.analysis.diagnostics.federation_status.error.clear();

        let err = label.validate().unwrap_err();
        assert!(matches!(
            rule_of(&err, "cluster_context.clusters[1].name"),
            Rule::Inconsistent { reason } if reason.contains("duplicate")
        ));
        assert!(err.has_violation("analysis.diagnostics.federation_status.error"));
    }

    #[test]
    fn test_multi_cluster_needs_two_clusters() {
        let mut label = multi_cluster();
        label.cluster_context.clusters.truncate(1);

        let err = label.validate().unwrap_err();
        assert_eq!(
            err.fields().collect::<Vec<_>>(),
            vec!["cluster_context.clusters"]
        );
    }

    #[test]
    fn test_validation_does_not_mutate() {
        let label = DeploymentLabel::new("why did rollout stall?");
        let before = label.clone();
        assert!(label.validate().is_err());
        assert_eq!(label, before);
    }
}

mod wire_tests {
    use super::*;

    #[test]
    fn test_populated_labels_round_trip() {
        for label in all_populated() {
            let json = label.to_json().unwrap();
            let back = AnyLabel::from_json(&json).unwrap();
            assert_eq!(back, label);
        }
    }

    #[test]
    fn test_additional_floats_round_trip_exactly() {
        let values = [
            1.0715660391465826e-75,
            0.1 + 0.2,
            std::f64::consts::PI,
            f64::MIN_POSITIVE,
            f64::MAX,
            -2.2250738585072014e-308,
            123456.78901234567,
        ];

        let mut qa = basic_qa();
        for (i, value) in values.iter().enumerate() {
            qa.context
                .additional
                .insert(format!("sample_{}", i), serde_json::json!(value));
        }
        let label = AnyLabel::from(qa);

        let back = AnyLabel::from_json(&label.to_json().unwrap()).unwrap();
        assert_eq!(back, label);

        let AnyLabel::BasicQa(qa) = &back else {
            panic!("expected basic_qa label, got {:?}", back.label_type());
        };
        for (i, value) in values.iter().enumerate() {
            let got = qa.context.additional[&format!("sample_{}", i)]
                .as_f64()
                .unwrap();
            assert_eq!(got.to_bits(), value.to_bits(), "sample_{} drifted", i);
        }
    }

    #[test]
    fn test_concrete_variant_round_trip() {
        let label = deployment();
        let json = serde_json::to_string(&label).unwrap();
        let back: DeploymentLabel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, label);
    }

    #[test]
    fn test_base_fields_are_flattened() {
        let label = AnyLabel::from(basic_qa());
        let json = serde_json::to_value(&label).unwrap();

        assert_eq!(json["label_type"], "basic_qa");
        assert_eq!(json["id"], label.id());
        assert_eq!(json["question"], "Why is my pod stuck in Pending?");
        assert!(json["timestamp"].is_string());
        assert!(json.get("base").is_none());
    }

    #[test]
    fn test_kubernetes_shaped_keys() {
        let json = serde_json::to_value(network()).unwrap();
        let peer = &json["analysis"]["network_policies"][0]["spec"]["ingress"][0]["from"][0];
        assert_eq!(peer["namespaceSelector"]["matchLabels"]["team"], "backend");
        assert!(peer.get("podSelector").is_some());

        let json = serde_json::to_value(multi_cluster()).unwrap();
        let federation = &json["analysis"]["diagnostics"]["federation_status"];
        assert_eq!(federation["kubefed_controller"], "Running");
        assert!(federation.get("controller").is_none());
    }

    #[test]
    fn test_optional_fields_omitted() {
        let json = serde_json::to_value(service_mesh()).unwrap();
        let spans = &json["telemetry"]["traces"][0]["spans"];
        assert!(spans[0].get("error").is_none());
        assert!(spans[1].get("error").is_some());

        let json = serde_json::to_value(resource()).unwrap();
        let memory = &json["current_state"]["resources"]["memory"];
        assert!(memory.get("throttling").is_none());
        assert!(memory.get("utilization").is_none());
    }

    #[test]
    fn test_missing_payload_keys_default() {
        let json = r#"{
            "label_type": "deployment",
            "id": "deployment-1700000000",
            "question": "why did rollout stall?",
            "timestamp": "2023-11-14T22:13:20Z",
            "deployment_context": { "service": "payments" }
        }"#;

        let label = AnyLabel::from_json(json).unwrap();
        let AnyLabel::Deployment(deployment) = &label else {
            panic!("expected deployment label, got {:?}", label.label_type());
        };
        assert_eq!(deployment.deployment_context.service, "payments");
        assert_eq!(deployment.analysis.status, DeploymentStatus::default());
        assert_eq!(label.timestamp().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_negative_counts_reach_validation() {
        let json = r#"{
            "label_type": "deployment",
            "id": "deployment-1700000000",
            "question": "why did rollout stall?",
            "timestamp": "2023-11-14T22:13:20Z",
            "analysis": { "status": { "desired_replicas": -2 } }
        }"#;

        let label = AnyLabel::from_json(json).unwrap();
        let err = label.validate().unwrap_err();
        assert!(matches!(
            rule_of(&err, "analysis.status.desired_replicas"),
            Rule::OutOfRange { value: -2, .. }
        ));
    }

    #[test]
    fn test_unknown_label_type_tag_rejected() {
        let json = r#"{"label_type":"storage","id":"storage-1","question":"q","timestamp":"2023-11-14T22:13:20Z"}"#;
        assert!(matches!(
            AnyLabel::from_json(json),
            Err(crate::LabelError::Serialization(_))
        ));
    }
}
