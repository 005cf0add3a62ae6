//! Size estimation.
//!
//! The estimator walks a database document once and counts every element that
//! ends up in a variable-length region. It visits exactly the children the
//! builder visits, so a build fills every arena to capacity.

use truecrowd_xml::XmlNode;

use crate::builder::nodes::{Element, Sections};
use crate::structs::{Estimate, MAX_COMPONENTS, MAX_TAGS};
use crate::{Error, Result};

/// Count every region of the database described by `root`.
pub fn estimate(root: &XmlNode) -> Result<Estimate> {
    estimate_sections(&Sections::locate(root)?)
}

pub(crate) fn estimate_sections(sections: &Sections<'_>) -> Result<Estimate> {
    let mut counts = Estimate::default();

    if let Some(tags) = sections.tags {
        let count = tags.count_children("Tag");
        if count > MAX_TAGS {
            return Err(Error::CapacityExceeded {
                what: "Tag",
                capacity: MAX_TAGS,
                owner: None,
            });
        }
        counts.tags = count as u32;
    }

    let entries = Element::new(sections.component_entries, "ComponentEntries", None);
    for component in entries.children("Component", None) {
        counts.component_entries += 1;
        if counts.component_entries as usize > MAX_COMPONENTS {
            return Err(Error::CapacityExceeded {
                what: "Component",
                capacity: MAX_COMPONENTS,
                owner: None,
            });
        }

        for resource in component.children("Resource", None) {
            let name = resource.required("name")?;
            counts.resource_entries += 1;
            counts.string_bytes += string_size(name);

            for lod in resource.children("LOD", Some(name)) {
                counts.lods += 1;
                for part in lod.children("ModelPart", Some(name)) {
                    counts.model_parts += 1;
                    counts.string_bytes += string_size(part.required("name")?);
                }
            }

            for texture_set in resource.children("TextureSet", Some(name)) {
                counts.texture_sets += 1;
                counts.texture_set_slots += 1;
                counts.string_bytes += string_size(texture_set.required("name")?);
                counts.colour_tints += texture_set.node.count_children("ColourTint") as u32;
                counts.override_params += texture_set.node.count_children("OverrideParam") as u32;
            }
        }
    }

    tracing::debug!(?counts, "estimated database size");
    Ok(counts)
}

fn string_size(text: &str) -> u32 {
    text.len() as u32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use truecrowd_xml::XmlDocument;

    #[test]
    fn test_counts_only_known_children() {
        let doc = XmlDocument::parse(
            r#"<TrueCrowdDataBase>
                <Definition><Tags><Tag>A</Tag><Tag>B</Tag><Note/></Tags></Definition>
                <ComponentEntries>
                    <Component name="Body">
                        <Resource name="Ped" type="0">
                            <LOD><ModelPart name="Head"/><ModelPart name="Legs"/><Other/></LOD>
                            <TextureSet name="Skin">
                                <ColourTint r="1" g="2" b="3"/>
                                <OverrideParam sampler="Diffuse"/>
                            </TextureSet>
                        </Resource>
                        <Comment name="ignored"/>
                    </Component>
                    <Unrelated/>
                </ComponentEntries>
            </TrueCrowdDataBase>"#,
        )
        .unwrap();

        let counts = estimate(&doc.root).unwrap();
        assert_eq!(
            counts,
            Estimate {
                tags: 2,
                component_entries: 1,
                resource_entries: 1,
                lods: 1,
                model_parts: 2,
                texture_set_slots: 1,
                texture_sets: 1,
                colour_tints: 1,
                override_params: 1,
                string_bytes: 4 + 5 + 5 + 5,
            }
        );
    }

    #[test]
    fn test_too_many_tags() {
        let tags = (0..=MAX_TAGS).map(|i| XmlNode::new("Tag").text(format!("T{i}")));
        let root = XmlNode::new("TrueCrowdDataBase")
            .child(XmlNode::new("Definition").child(XmlNode::new("Tags").children(tags)))
            .child(XmlNode::new("ComponentEntries"));
        assert!(matches!(
            estimate(&root),
            Err(Error::CapacityExceeded { what: "Tag", .. })
        ));
    }
}
