#[derive(landingkit::form::FormModel)]
struct TupleForm(String);

fn main() {}
