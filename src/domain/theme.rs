#[derive(Clone, Debug)]
pub struct Theme {
    pub id: i64,
    pub keyword: String,
    pub is_active: bool,
}
