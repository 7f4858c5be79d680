use dashboard_domain::{AttributeValue, DashboardError, Record};
use dashboard_forms::{
    EditForm, FieldControl, FieldSerializer, FormCatalog, FormKind, QueueNamesFieldSerializer,
    SubmissionState,
};
use serde_json::json;

#[test]
fn test_schedule_with_no_repeat_is_rejected_locally() {
    let record = Record::from_wire(&json!({
        "Id": 14,
        "Name": "Weekly report",
        "QueueName": "reports",
        "StartOn": "/Date(1709647620000)/",
        "EndOn": null,
        "RepeatType": "None",
        "RepeatValue": null,
        "Enabled": true,
        "JobCount": 1,
    }))
    .unwrap();

    let mut form = EditForm::new(FormCatalog::standard().get(FormKind::Schedule), &record);
    assert_eq!(form.form().controls("StartOn")[0].value, "2024-03-05 2:07 PM");
    assert!(form.form().controls("Enabled")[0].checked);

    let Err(DashboardError::Validation(errors)) = form.begin_submit() else {
        panic!("schedule without repeat settings must fail validation");
    };
    assert_eq!(errors.len(), 2);
    assert!(errors["RepeatType"].starts_with("Repeat must be one of"));
    assert_eq!(errors["RepeatValue"], "Every must be a number greater than 0.");
    assert_eq!(form.state(), SubmissionState::EditingWithErrors);

    form.form_mut().set_value("RepeatType", "Weeks");
    form.form_mut().set_value("RepeatValue", "2");
    let attributes = form.begin_submit().unwrap();
    assert_eq!(attributes["Id"], AttributeValue::Int(14));
    assert_eq!(attributes["RepeatValue"], AttributeValue::Int(2));
    assert_eq!(attributes["Enabled"], AttributeValue::Bool(true));
}

#[test]
fn test_queue_names_property() {
    let serializer = QueueNamesFieldSerializer;
    let cases = [
        ("default", "default"),
        ("default\nreports", "default\nreports"),
        ("  default \n\n reports\n", "default\nreports"),
    ];

    for (input, expected) in cases {
        let mut controls = vec![FieldControl::textarea()];
        serializer.deserialize(&AttributeValue::text(input), &mut controls);
        assert_eq!(serializer.serialize(&controls), AttributeValue::text(expected));
    }

    for blank in ["", "   ", "\n\t\n"] {
        let controls = vec![FieldControl::textarea().with_value(blank)];
        assert_eq!(serializer.serialize(&controls), AttributeValue::text("*"));
    }
}

#[test]
fn test_signal_forms_offer_area_signals() {
    let catalog = FormCatalog::standard();
    let mut record = Record::with_id(5);
    record.set("Signal", "None");

    let mut form = EditForm::new(catalog.get(FormKind::WorkingSignal), &record);
    assert!(form.begin_submit().is_err());
    assert_eq!(form.errors().fields["Signal"], "Please choose a signal.");

    form.form_mut().set_value("Signal", "Cancel");
    let attributes = form.begin_submit().unwrap();
    assert_eq!(attributes["Signal"], AttributeValue::text("Cancel"));
}
