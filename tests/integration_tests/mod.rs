mod collection;
mod compile;
mod cursor;
