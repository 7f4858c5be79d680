use dashboard_domain::route::{decode, encode, match_fragment};
use dashboard_domain::{Area, AreaModel, ListPage, Record, RouteParams};
use serde_json::json;

#[test]
fn test_fragment_drives_model_and_back() {
    let params = decode("#workers/q/build%20box/p/3/id/12/signal");
    assert_eq!(params.area, Area::Workers);

    let mut model = AreaModel::new(params.area);
    model.import_route(&params);

    let page = ListPage::from_wire(&json!({
        "Records": [
            {"Id": 11, "Name": "alpha", "Signal": "None"},
            {"Id": 12, "Name": "beta", "Signal": "None"},
        ],
        "PageCount": 4,
        "PageNumber": 3,
        "TotalCount": 38,
    }))
    .unwrap();
    model.replace_collection(page);

    let state = model.state();
    assert_eq!(state.search, "build box");
    assert_eq!(state.page_number, 3);
    assert_eq!(state.total_count, 38);
    assert!(state.find(12).unwrap().selected);
    assert!(!state.find(11).unwrap().selected);

    assert_eq!(
        encode(&model.route_params()),
        "workers/q/build%20box/p/3/id/12/signal"
    );
}

#[test]
fn test_every_area_round_trips_its_bare_fragment() {
    for area in Area::ALL {
        let params = RouteParams::new(area).with_parent(if area.is_nested() { 2 } else { 0 });
        let fragment = encode(&params);
        let matched = match_fragment(&fragment);
        assert_eq!(matched.area, area, "{fragment}");
        assert_eq!(matched.normalize(), params.normalize());
    }
}

#[test]
fn test_record_wire_round_trip_keeps_shape() {
    let wire = json!({
        "Id": 5,
        "Name": "Hourly cleanup",
        "QueueName": "default",
        "StartOn": "2024-06-01T08:00:00.000Z",
        "EndOn": null,
        "RepeatType": "Hours",
        "RepeatValue": 1,
        "Enabled": true,
        "JobCount": 2,
    });

    let record = Record::from_wire(&wire).unwrap();
    assert_eq!(record.to_wire(), wire);
}
