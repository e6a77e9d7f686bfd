use landingkit::form::{FieldKey, FieldLens, FormModel};

#[derive(Clone, Default, landingkit::form::FormModel)]
struct NewsletterForm {
    email: String,
    opt_in: bool,
}

fn main() {
    let fields = NewsletterForm::fields();
    let lens = fields.email();
    let mut model = NewsletterForm::default();
    lens.set(&mut model, "reader@example.com".to_string());
    fields.opt_in().set(&mut model, true);

    assert_eq!(lens.key().as_str(), "email");
    assert_eq!(lens.get(&model), "reader@example.com");
    assert_eq!(NewsletterForm::field_keys().len(), 2);
    assert_eq!(model.text(lens.key()), Some("reader@example.com"));
    assert_eq!(model.text(FieldKey::new("opt_in")), None);
    assert_eq!(NewsletterForm::field_key("email"), Some(lens.key()));
    assert!(model.opt_in);
}
