//! End-to-end tests for the prediction engine

#[cfg(test)]
mod engine_behaviour {
    use crate::models::{FlightQuery, PredictionQuality, FEATURE_NAMES, NUM_FEATURES};
    use crate::predictor::{
        load_model_artifact, AdapterState, ConstantBaseline, FallbackPolicy, HeuristicBaseline,
        LogisticDelayModel, ModelAdapter, ModelKind, PredictionEngine,
    };
    use std::path::Path;
    use std::sync::Arc;

    const AIRPORTS: &[&str] = &["JFK", "LAX", "ORD", "CDG", "LHR", "NRT", "SYD", "XYZ", "KBOS"];
    const DEPARTURES: &[&str] = &[
        "2024-05-01T10:00:00Z",
        "2024-07-19T18:30:00-04:00",
        "2024-12-24T23:59:00+09:00",
        "2025-01-05T05:15:00+01:00",
    ];

    fn valid_queries() -> Vec<FlightQuery> {
        let mut queries = Vec::new();
        for (i, origin) in AIRPORTS.iter().enumerate() {
            for destination in AIRPORTS.iter().skip(i + 1) {
                for departure in DEPARTURES {
                    queries.push(FlightQuery::new("DL405", *origin, *destination, *departure));
                }
            }
        }
        queries
    }

    fn logistic_engine() -> PredictionEngine {
        let weights = [1.5, 0.4, 0.3, 0.2, 2.0, -0.5, 0.8, -0.3, 0.6];
        assert_eq!(weights.len(), NUM_FEATURES);
        let adapter = Arc::new(ModelAdapter::new());
        adapter
            .load(Box::new(LogisticDelayModel::new(weights, -2.0, "2024.05.1")))
            .unwrap();
        PredictionEngine::new(adapter)
    }

    #[test]
    fn test_example_no_model_loaded() {
        let engine = PredictionEngine::new(Arc::new(ModelAdapter::new()));
        let result = engine.predict(&FlightQuery::new("AB123", "JFK", "LAX", "2024-05-01T10:00:00Z"));

        assert_eq!(result.probability, 0.1);
        assert_eq!(result.quality, PredictionQuality::FallbackNoModel);
    }

    #[test]
    fn test_example_constant_baseline_loaded() {
        let adapter = Arc::new(ModelAdapter::new());
        let engine = PredictionEngine::new(adapter.clone());
        let query = FlightQuery::new("AB123", "JFK", "LAX", "2024-05-01T10:00:00Z");

        assert_eq!(engine.predict(&query).quality, PredictionQuality::FallbackNoModel);

        adapter.load(Box::new(ConstantBaseline::new(0.42))).unwrap();
        let result = engine.predict(&query);
        assert_eq!(result.probability, 0.42);
        assert_eq!(result.quality, PredictionQuality::Model);
    }

    #[test]
    fn test_valid_queries_stay_in_unit_interval() {
        let engines = [
            logistic_engine(),
            PredictionEngine::new(Arc::new(ModelAdapter::with_baseline(Box::new(
                HeuristicBaseline::new(),
            )))),
        ];
        for engine in &engines {
            for query in valid_queries() {
                let result = engine.predict(&query);
                assert_eq!(result.quality, PredictionQuality::Model, "{:?}", query);
                assert!(
                    (0.0..=1.0).contains(&result.probability),
                    "{:?} -> {}",
                    query,
                    result.probability
                );
            }
        }
    }

    #[test]
    fn test_malformed_queries_never_fail() {
        let policy = FallbackPolicy::new(0.07).unwrap();
        let adapter = Arc::new(ModelAdapter::with_baseline(Box::new(HeuristicBaseline::new())));
        let engine = PredictionEngine::with_policy(adapter, policy);

        let malformed = [
            FlightQuery::new("AB123", "JFK", "LAX", "2024-05-01 10:00"),
            FlightQuery::new("AB123", "JFK", "LAX", ""),
            FlightQuery::new("AB123", "LAX", "LAX", "2024-05-01T10:00:00Z"),
            FlightQuery::new("AB123", "KLAX", "LAX", "2024-05-01T10:00:00Z"),
            FlightQuery::new("AB123", "J F K", "LAX", "2024-05-01T10:00:00Z"),
            FlightQuery::new("AB123", "JFK", "", "2024-05-01T10:00:00Z"),
        ];

        for query in &malformed {
            let result = engine.predict(query);
            assert_eq!(result.quality, PredictionQuality::FallbackInvalidInput, "{:?}", query);
            assert_eq!(result.probability, 0.07);
        }
    }

    #[test]
    fn test_unrecognized_flight_ids_are_scored() {
        let adapter = Arc::new(ModelAdapter::new());
        adapter.load(Box::new(ConstantBaseline::new(0.42))).unwrap();
        let engine = PredictionEngine::new(adapter);

        for flight in ["AB12345", "", "123456", "N123-XY"] {
            let result = engine.predict(&FlightQuery::new(flight, "JFK", "LAX", "2024-05-01T10:00:00Z"));
            assert_eq!(result.quality, PredictionQuality::Model, "{:?}", flight);
            assert_eq!(result.probability, 0.42);
        }
    }

    fn onnx_engine(fixture: &str) -> (Arc<ModelAdapter>, PredictionEngine) {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(fixture);
        let artifact = load_model_artifact(&path, None).unwrap();
        let adapter = Arc::new(ModelAdapter::new());
        adapter.load(artifact.model).unwrap();
        (adapter.clone(), PredictionEngine::new(adapter))
    }

    #[test]
    fn test_onnx_model_end_to_end() {
        let (adapter, engine) = onnx_engine("delay-pair-v1.onnx");

        let status = adapter.status();
        assert_eq!(status.state, AdapterState::Loaded);
        let active = status.active.unwrap();
        assert_eq!(active.kind, ModelKind::Onnx);
        assert_eq!(active.version, "delay-pair-v1");

        let known = engine.predict(&FlightQuery::new("AB123", "JFK", "LAX", "2024-05-01T10:00:00Z"));
        assert_eq!(known.quality, PredictionQuality::Model);
        assert_eq!(known.model_version.as_deref(), Some("delay-pair-v1"));
        assert!((known.probability - 0.75).abs() < 1e-5);

        let unknown = engine.predict(&FlightQuery::new("AB123", "XYZ", "LAX", "2024-05-01T10:00:00Z"));
        assert!((unknown.probability - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_onnx_output_width_error_falls_back() {
        let (_, engine) = onnx_engine("delay-triple-v1.onnx");
        let result = engine.predict(&FlightQuery::new("AB123", "JFK", "LAX", "2024-05-01T10:00:00Z"));

        assert_eq!(result.quality, PredictionQuality::FallbackModelError);
        assert_eq!(result.probability, 0.1);
        assert_eq!(result.model_version, None);
    }

    #[test]
    fn test_identical_inputs_identical_outputs() {
        let engine = logistic_engine();
        for query in valid_queries() {
            assert_eq!(engine.predict(&query), engine.predict(&query.clone()));
        }
    }

    #[test]
    fn test_concurrent_predictions_agree() {
        let engine = Arc::new(logistic_engine());
        let queries = valid_queries();
        let expected: Vec<_> = queries.iter().map(|q| engine.predict(q)).collect();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let engine = engine.clone();
                let queries = &queries;
                let expected = &expected;
                scope.spawn(move || {
                    for (query, want) in queries.iter().zip(expected) {
                        assert_eq!(&engine.predict(query), want);
                    }
                });
            }
        });
    }

    #[test]
    fn test_feature_vector_has_fixed_shape() {
        let engine = logistic_engine();
        for query in valid_queries() {
            let features = engine.features(&query).unwrap();
            assert_eq!(features.to_array().len(), FEATURE_NAMES.len());
        }
    }
}
