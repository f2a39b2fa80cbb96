/// Construct a [`Value::Map`][crate::Value::Map] from a list of entries.
///
/// Keys are identifiers or string literals. Values are `None`, nested lists
/// `[...]`, nested maps `{...}`, or any expression with a `From` impl into
/// [`Value`][crate::Value].
///
/// # Examples
///
/// ```
/// let ctx = droplet::value! {
///     title: "Tracks",
///     tracks: ["intro", "outro"],
///     album: { name: "Side A", "year": 1999 },
///     rating: None,
/// };
/// ```
#[macro_export]
macro_rules! value {
    ($($tt:tt)*) => {
        $crate::Value::Map({
            #[allow(unused_mut)]
            let mut map = $crate::Map::new();
            $crate::_value!(@map map $($tt)*);
            map
        })
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! _value {
    // Map entries: `key: tokens,` repeated.
    (@map $map:ident) => {};

    (@map $map:ident $key:tt : $($rest:tt)*) => {
        $crate::_value!(@entry $map $key [] $($rest)*);
    };

    // Munch the value tokens up to the next top level comma.
    (@entry $map:ident $key:tt [$($v:tt)+] , $($rest:tt)*) => {
        let _ = $map.insert($crate::_value!(@key $key), $crate::_value!(@item $($v)+));
        $crate::_value!(@map $map $($rest)*);
    };

    (@entry $map:ident $key:tt [$($v:tt)+]) => {
        let _ = $map.insert($crate::_value!(@key $key), $crate::_value!(@item $($v)+));
    };

    (@entry $map:ident $key:tt [$($v:tt)*] $next:tt $($rest:tt)*) => {
        $crate::_value!(@entry $map $key [$($v)* $next] $($rest)*);
    };

    // List elements, same munching as map values.
    (@list $list:ident []) => {};

    (@list $list:ident [$($v:tt)+]) => {
        $list.push($crate::_value!(@item $($v)+));
    };

    (@list $list:ident [$($v:tt)+] , $($rest:tt)*) => {
        $list.push($crate::_value!(@item $($v)+));
        $crate::_value!(@list $list [] $($rest)*);
    };

    (@list $list:ident [$($v:tt)*] $next:tt $($rest:tt)*) => {
        $crate::_value!(@list $list [$($v)* $next] $($rest)*);
    };

    (@key $key:ident) => {
        ::std::string::String::from(stringify!($key))
    };

    (@key $key:literal) => {
        ::std::string::String::from($key)
    };

    (@item None) => {
        $crate::Value::None
    };

    (@item [$($tt:tt)*]) => {
        $crate::Value::List({
            #[allow(unused_mut)]
            let mut list = $crate::List::new();
            $crate::_value!(@list list [] $($tt)*);
            list
        })
    };

    (@item {$($tt:tt)*}) => {
        $crate::value! { $($tt)* }
    };

    (@item $($e:tt)+) => {
        $crate::Value::from($($e)+)
    };
}
