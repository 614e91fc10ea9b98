use std::fmt::Display;

// Join the display forms of an iterator's items
pub fn join_display<I>(separator: &str, iter: I) -> String
where I: Iterator,
      I::Item: Display
{
    let mut out = String::new();
    for (i, item) in iter.enumerate()
    {
        if i > 0 { out.push_str(separator); }
        out.push_str(&item.to_string());
    }
    out
}

/// The type name without its module path, e.g. `my_crate::level::LevelArgs` becomes `LevelArgs`.
/// Generic arguments are left as-is: `alloc::vec::Vec<u8>` becomes `Vec<u8>`
#[inline] #[must_use]
pub fn short_type_name<T: ?Sized>() -> &'static str
{
    shorten_type_name(std::any::type_name::<T>())
}

#[must_use]
pub fn shorten_type_name(type_name: &str) -> &str
{
    let generics_start = type_name.find('<').unwrap_or(type_name.len());
    match type_name[..generics_start].rfind(':')
    {
        None => type_name,
        Some(i) => &type_name[(i + 1)..],
    }
}
