//! GLSL sources for the scene's programs.

use crate::lights::POINT_LIGHT_COUNT;

/// Shared by the lit and light-source programs.
pub const LIT_VERTEX: &str = r#"#version 330 core
layout(location = 0) in vec3 aPos;
layout(location = 1) in vec3 aColor;
layout(location = 2) in vec2 aTexCoord;
layout(location = 3) in vec3 aNormal;

uniform mat4 model;
uniform mat4 view;
uniform mat4 projection;

out vec3 ioFragPos;
out vec3 ioNormal;
out vec2 ioTexCoord;

void main()
{
    ioFragPos   = vec3(model * vec4(aPos, 1.0));
    gl_Position = projection * view * vec4(ioFragPos, 1.0);
    ioTexCoord  = aTexCoord;
    ioNormal    = mat3(transpose(inverse(model))) * aNormal;
}
"#;

const LIT_FRAGMENT_BODY: &str = r#"
out vec4 fragColor;

struct Material {
    sampler2D diffuse;
    sampler2D specular;
    float     shininess;
};

struct DirLight {
    vec3 direction;

    vec3 ambient;
    vec3 diffuse;
    vec3 specular;
};

struct PointLight {
    vec3 position;

    vec3 ambient;
    vec3 diffuse;
    vec3 specular;

    float constant;
    float linear;
    float quadratic;
};

struct SpotLight {
    vec3  position;
    vec3  direction;
    float cutOff;
    float outerCutOff;

    vec3 ambient;
    vec3 diffuse;
    vec3 specular;

    float constant;
    float linear;
    float quadratic;
};

in vec3 ioFragPos;
in vec3 ioNormal;
in vec2 ioTexCoord;

uniform Material   material;
uniform DirLight   dirLight;
uniform PointLight pointLights[NUM_POINT_LIGHTS];
uniform SpotLight  spotLight;
uniform vec3       viewPos;

float Attenuate(float constant, float linear, float quadratic, float distance)
{
    return 1.0 / (constant + linear * distance + quadratic * distance * distance);
}

vec3 CalcDirLight(DirLight light, vec3 normal, vec3 viewDir)
{
    vec3  lightDir    = normalize(-light.direction);
    float diffuseVal  = max(dot(normal, lightDir), 0.0);
    vec3  reflectDir  = reflect(-lightDir, normal);
    float specularVal = pow(max(dot(viewDir, reflectDir), 0.0), material.shininess);

    vec3 albedo   = vec3(texture(material.diffuse, ioTexCoord));
    vec3 ambient  = light.ambient  * albedo;
    vec3 diffuse  = light.diffuse  * diffuseVal * albedo;
    vec3 specular = light.specular * specularVal * vec3(texture(material.specular, ioTexCoord));
    return ambient + diffuse + specular;
}

vec3 CalcPointLight(PointLight light, vec3 normal, vec3 viewDir)
{
    vec3  lightDir    = normalize(light.position - ioFragPos);
    float diffuseVal  = max(dot(normal, lightDir), 0.0);
    vec3  reflectDir  = reflect(-lightDir, normal);
    float specularVal = pow(max(dot(viewDir, reflectDir), 0.0), material.shininess);

    float attenuation = Attenuate(light.constant, light.linear, light.quadratic,
                                  length(light.position - ioFragPos));

    vec3 albedo   = vec3(texture(material.diffuse, ioTexCoord));
    vec3 ambient  = light.ambient  * albedo;
    vec3 diffuse  = light.diffuse  * diffuseVal * albedo;
    vec3 specular = light.specular * specularVal * vec3(texture(material.specular, ioTexCoord));
    return (ambient + diffuse + specular) * attenuation;
}

vec3 CalcSpotLight(SpotLight light, vec3 normal, vec3 viewDir)
{
    vec3  lightDir    = normalize(light.position - ioFragPos);
    float diffuseVal  = max(dot(normal, lightDir), 0.0);
    vec3  reflectDir  = reflect(-lightDir, normal);
    float specularVal = pow(max(dot(viewDir, reflectDir), 0.0), material.shininess);

    // Soft edge between the inner and outer cone.
    float theta     = dot(lightDir, normalize(-light.direction));
    float epsilon   = light.cutOff - light.outerCutOff;
    float intensity = clamp((theta - light.outerCutOff) / epsilon, 0.0, 1.0);

    float attenuation = Attenuate(light.constant, light.linear, light.quadratic,
                                  length(light.position - ioFragPos));

    vec3 albedo   = vec3(texture(material.diffuse, ioTexCoord));
    vec3 ambient  = light.ambient  * albedo;
    vec3 diffuse  = light.diffuse  * diffuseVal * albedo * intensity;
    vec3 specular = light.specular * specularVal * vec3(texture(material.specular, ioTexCoord)) * intensity;
    return (ambient + diffuse + specular) * attenuation;
}

void main()
{
    vec3 normal  = normalize(ioNormal);
    vec3 viewDir = normalize(viewPos - ioFragPos);

    vec3 result = CalcDirLight(dirLight, normal, viewDir);
    for (int i = 0; i < NUM_POINT_LIGHTS; i++)
        result += CalcPointLight(pointLights[i], normal, viewDir);
    result += CalcSpotLight(spotLight, normal, viewDir);

    fragColor = vec4(result, 1.0);
}
"#;

/// Unlit white, for the small cubes marking each point light.
pub const LIGHT_SOURCE_FRAGMENT: &str = r#"#version 330 core
out vec4 fragColor;

void main()
{
    fragColor = vec4(1.0);
}
"#;

pub const BRICK_VERTEX: &str = r#"#version 330 core
layout(location = 0) in vec3 aPos;
layout(location = 1) in vec3 aColor;
layout(location = 2) in vec2 aTexCoord;

uniform mat4 model;
uniform mat4 view;
uniform mat4 projection;

out vec3 ioColor;
out vec2 ioTexCoord;

void main()
{
    gl_Position = projection * view * model * vec4(aPos, 1.0);
    ioColor     = aColor;
    ioTexCoord  = aTexCoord;
}
"#;

/// Brick texture with the face overlay blended over it.
pub const BRICK_FRAGMENT: &str = r#"#version 330 core
out vec4 fragColor;

in vec3 ioColor;
in vec2 ioTexCoord;

uniform sampler2D texture1;
uniform sampler2D texture2;

void main()
{
    fragColor = mix(texture(texture1, ioTexCoord), texture(texture2, ioTexCoord), 0.2) * vec4(ioColor, 1.0);
}
"#;

/// Lit fragment stage with the point light array sized to `POINT_LIGHT_COUNT`.
pub fn lit_fragment() -> String {
    format!(
        "#version 330 core\n#define NUM_POINT_LIGHTS {}\n{}",
        POINT_LIGHT_COUNT, LIT_FRAGMENT_BODY
    )
}
