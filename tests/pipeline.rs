use geo::{polygon, MultiPolygon};
use regionwx::{
    read_cwb_observations, read_regions_geojson, Attribution, AttributionError, CoordinateFrame, GeometryIndex,
    MalformedReason, Observation, Pipeline, Reduced, ReductionRules, RegionAggregator, RegionSource, RulesConfig,
};
use serde_json::{json, Value};

/// Three townships in a row along the coast, plus one inland township that
/// overlaps the middle one.
///
/// ```
///   +-------+-------+-------+
///   |  Toucheng      Su-ao  |      y = 25
///   |   0   |   1   |   2   |
///   +-------+-------+-------+      y = 24
///   x=121  122     123     124
/// ```
fn townships() -> Vec<u8> {
    let square = |name: &str, x0: f64, y0: f64, size: f64| json!({
        "type": "Feature",
        "properties": { "T_Name": name, "C_Name": "Yilan County" },
        "geometry": {
            "type": "Polygon",
            "coordinates": [[[x0, y0], [x0 + size, y0], [x0 + size, y0 + size], [x0, y0 + size], [x0, y0]]],
        },
    });
    serde_json::to_vec(&json!({
        "type": "FeatureCollection",
        "features": [
            square("Toucheng", 121.0, 24.0, 1.0),
            square("Jiaoxi", 122.0, 24.0, 1.0),
            square("Su-ao", 123.0, 24.0, 1.0),
            square("Datong", 122.5, 24.5, 1.0),
        ],
    })).unwrap()
}

fn station(id: &str, lat: &str, lon: &str, elements: &[(&str, &str)]) -> Value {
    json!({
        "lat": lat,
        "lon": lon,
        "locationName": id,
        "stationId": id,
        "time": { "obsTime": "2023-05-10 13:00:00" },
        "weatherElement": elements.iter()
            .map(|(name, value)| json!({ "elementName": name, "elementValue": value }))
            .collect::<Vec<_>>(),
    })
}

fn feed() -> Vec<u8> {
    serde_json::to_vec(&json!({
        "success": "true",
        "records": {
            "location": [
                station("T1", "24.5", "121.5", &[("TEMP", "10.0"), ("WDIR", "350"), ("WDSD", "2.0")]),
                station("T2", "24.6", "121.4", &[("TEMP", "-99"), ("WDIR", "10"), ("WDSD", "2.0")]),
                station("T3", "24.4", "121.6", &[("TEMP", "20.0"), ("WDIR", "-99"), ("WDSD", "-99")]),
                station("J1", "24.2", "122.2", &[("TEMP", "-15.0"), ("WDIR", "0"), ("WDSD", "3.0")]),
                station("J2", "24.3", "122.3", &[("WDIR", "180"), ("WDSD", "3.0")]),
                station("D1", "24.8", "122.8", &[("HUMD", "0.9")]),
                station("SEA", "24.5", "125.5", &[("TEMP", "25.0")]),
                station("BAD", "91.0", "121.5", &[("TEMP", "25.0")]),
                station("BLANK", "", "121.5", &[("TEMP", "25.0")]),
            ],
        },
    })).unwrap()
}

fn pipeline() -> Pipeline {
    let sources = read_regions_geojson(&townships(), "T_Name", None).unwrap();
    let index = GeometryIndex::new(sources).unwrap();
    Pipeline::new(index, ReductionRules::weather_defaults())
}

#[test]
fn every_region_gets_exactly_one_record() {
    let pipeline = pipeline();
    let aggregation = pipeline.run(&read_cwb_observations(&feed()).unwrap());

    assert_eq!(aggregation.len(), pipeline.index().len());
    let names: Vec<_> = aggregation.records().iter().map(|record| record.region.to_string()).collect();
    assert_eq!(names, ["Toucheng", "Jiaoxi", "Su-ao", "Datong"]);
}

#[test]
fn empty_region_is_no_data_everywhere() {
    let aggregation = pipeline().run(&read_cwb_observations(&feed()).unwrap());
    let suao = aggregation.get("Su-ao").unwrap();

    assert_eq!(suao.observations, 0);
    assert_eq!(suao.fields.len(), ReductionRules::weather_defaults().len());
    assert!(suao.fields.iter().all(|field| field.value == Reduced::NoData && field.count == 0));
}

#[test]
fn reductions_follow_their_kinds() {
    let aggregation = pipeline().run(&read_cwb_observations(&feed()).unwrap());
    let toucheng = aggregation.get("Toucheng").unwrap();

    // TEMP {10, absent, 20}
    let temp = toucheng.get("TEMP").unwrap();
    assert_eq!((temp.value, temp.count), (Reduced::Scalar { value: 15.0 }, 2));
    assert_eq!(temp.out_of_range, Some(false));

    // WDIR {350, 10, absent}
    let Reduced::Angle { degrees } = toucheng.get("WDIR").unwrap().value else { panic!("expected an angle") };
    assert!((0.0..1e-9).contains(&degrees), "got {degrees}");

    let wind = toucheng.get("WIND").unwrap();
    let Reduced::Vector { speed, direction: Some(direction), .. } = wind.value else { panic!("expected a vector") };
    assert!(speed > 1.9 && speed <= 2.0);
    assert!((0.0..1e-6).contains(&direction), "got {direction}");
    assert_eq!(wind.count, 2);
}

#[test]
fn degenerate_direction_and_masked_temperature() {
    let aggregation = pipeline().run(&read_cwb_observations(&feed()).unwrap());
    let jiaoxi = aggregation.get("Jiaoxi").unwrap();

    // WDIR {0, 180}
    let wdir = jiaoxi.get("WDIR").unwrap();
    assert_eq!((wdir.value, wdir.count), (Reduced::NoData, 2));

    let wind = jiaoxi.get("WIND").unwrap();
    assert!(matches!(wind.value, Reduced::Vector { direction: None, .. }));

    let temp = jiaoxi.get("TEMP").unwrap();
    assert_eq!(temp.value, Reduced::Scalar { value: -15.0 });
    assert_eq!(temp.out_of_range, Some(true));
}

#[test]
fn overlap_resolves_to_first_region() {
    let aggregation = pipeline().run(&read_cwb_observations(&feed()).unwrap());

    // D1 lies inside both Jiaoxi and Datong; Jiaoxi comes first.
    assert_eq!(aggregation.get("Jiaoxi").unwrap().observations, 3);
    assert_eq!(aggregation.get("Datong").unwrap().observations, 0);
}

#[test]
fn dropped_observations_are_reported() {
    let aggregation = pipeline().run(&read_cwb_observations(&feed()).unwrap());
    let audit = aggregation.audit();

    let unattributed: Vec<_> = audit.unattributed.iter().map(|entry| entry.station.as_ref()).collect();
    assert_eq!(unattributed, ["SEA"]);

    let malformed: Vec<_> = audit.malformed.iter()
        .map(|entry| match &entry.error {
            Some(AttributionError::MalformedObservation { reason, .. }) => (entry.station.as_ref(), *reason),
            other => panic!("unexpected audit entry {other:?}"),
        })
        .collect();
    assert_eq!(malformed, [("BAD", MalformedReason::LatitudeOutOfRange), ("BLANK", MalformedReason::MissingLatitude)]);
    assert!(audit.mismatched.is_empty());

    let json = serde_json::to_value(audit).unwrap();
    assert_eq!(json["malformed"][0]["error"]["kind"], "malformed-observation");
    assert_eq!(json["malformed"][0]["error"]["reason"], "latitude-out-of-range");
}

#[test]
fn frame_mismatch_is_per_observation() {
    let pipeline = pipeline();
    let observations = vec![
        Observation::new("twd97", Some(24.5), Some(121.5)).with_frame(CoordinateFrame::Epsg(3826)),
        Observation::new("wgs84", Some(24.5), Some(121.5)).with_field("TEMP", Some(12.0)),
    ];
    let aggregation = pipeline.run(&observations);

    assert_eq!(aggregation.audit().mismatched.len(), 1);
    assert_eq!(aggregation.get("Toucheng").unwrap().value("TEMP"), Some(12.0));
}

#[test]
fn projected_observations_join_projected_regions() {
    // TWD97 / TM2 metres, easting in lon and northing in lat.
    let tile = MultiPolygon(vec![polygon![
        (x: 250_000.0, y: 2_700_000.0),
        (x: 260_000.0, y: 2_700_000.0),
        (x: 260_000.0, y: 2_710_000.0),
        (x: 250_000.0, y: 2_710_000.0)
    ]]);
    let twd97 = CoordinateFrame::Epsg(3826);
    let index = GeometryIndex::new(vec![RegionSource::new("tile", tile).with_frame(twd97)]).unwrap();

    let observations = vec![
        Observation::new("inside", Some(2_705_000.0), Some(255_000.0)).with_frame(twd97),
        Observation::new("outside", Some(2_800_000.0), Some(255_000.0)).with_frame(twd97),
    ];
    let attribution = Attribution::join(&index, &observations);

    assert_eq!(attribution.bucket_positions(0), &[0]);
    assert_eq!(attribution.audit().unattributed.iter().map(|e| e.position).collect::<Vec<_>>(), [1]);
    assert!(attribution.audit().malformed.is_empty());
}

#[test]
fn projected_point_against_geographic_index_is_a_mismatch() {
    let pipeline = pipeline();
    let observations = vec![
        Observation::new("twd97", Some(2_705_000.0), Some(255_000.0)).with_frame(CoordinateFrame::Epsg(3826)),
    ];
    let aggregation = pipeline.run(&observations);

    assert!(aggregation.audit().malformed.is_empty());
    assert!(matches!(
        aggregation.audit().mismatched[0].error,
        Some(AttributionError::CoordinateMismatch { .. }),
    ));
}

#[test]
fn runs_are_bit_identical() {
    let pipeline = pipeline();
    let observations = read_cwb_observations(&feed()).unwrap();

    let first = pipeline.run(&observations);
    let second = pipeline.run(&observations);
    assert_eq!(first, second);
    assert_eq!(first.to_csv_string().unwrap(), second.to_csv_string().unwrap());
}

#[test]
fn rules_file_round_trip_through_aggregator() {
    let json = serde_json::to_string(&RulesConfig::weather_defaults()).unwrap();
    let config: RulesConfig = serde_json::from_str(&json).unwrap();
    let aggregator = RegionAggregator::from_config(&config).unwrap();

    let index = GeometryIndex::new(read_regions_geojson(&townships(), "T_Name", None).unwrap()).unwrap();
    let observations = read_cwb_observations(&feed()).unwrap();
    let aggregation = aggregator.aggregate(&Attribution::join(&index, &observations));
    assert_eq!(aggregation, pipeline().run(&observations));
}

#[test]
fn bad_rules_fail_before_aggregation() {
    let config: RulesConfig = serde_json::from_value(json!({
        "rules": [
            { "field": "TEMP", "kind": "mean-skip-missing" },
            { "field": "WDIR", "kind": "vector-sum" },
        ],
    })).unwrap();
    let error = RegionAggregator::from_config(&config).unwrap_err();
    assert!(error.to_string().contains("vector-sum"));
}

#[test]
fn writes_csv_file() {
    let aggregation = pipeline().run(&read_cwb_observations(&feed()).unwrap());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("townships.csv");
    aggregation.write_csv(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 1 + 4);
    assert!(text.starts_with("region,observations,TEMP,TEMP_count,TEMP_out_of_range,"));
}
