pub mod resource;

#[cfg(test)]
mod tests;
