/// Client-side redirect
pub trait Navigator {
    fn navigate(&self, path: &str);
}
