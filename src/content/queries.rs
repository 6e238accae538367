//! GROQ queries used by the Sanity client.
//!
//! Projections flatten `slug.current` so the model side only ever sees a
//! plain string slug.

pub const GALLERY: &str = r#"*[_type=="artwork"] | order(featured desc, year desc, _createdAt desc)[0...60]{
  _id,
  title,
  "slug": slug.current,
  images,
  medium,
  dimensions,
  year,
  price,
  status,
  featured,
  soldAt
}"#;

pub const FEATURED: &str = r#"*[_type=="artwork" && featured == true] | order(year desc, _createdAt desc)[0...12]{
  _id,
  title,
  "slug": slug.current,
  images,
  medium,
  dimensions,
  year,
  price,
  status,
  featured,
  soldAt
}"#;

pub const ARTWORK_BY_SLUG: &str = r#"*[_type=="artwork" && slug.current == $slug][0]{
  _id,
  title,
  "slug": slug.current,
  images,
  medium,
  dimensions,
  year,
  price,
  status,
  description,
  featured,
  soldAt
}"#;

pub const HOMEPAGE: &str = r#"*[_type=="homepage"][0]"#;
